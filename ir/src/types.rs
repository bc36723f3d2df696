use std::{fmt, sync::Arc};

/// Representation of a value in emitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Int32,
    Int64,
    Double,
    /// Reference to a Runtime Object, possibly null.
    Object,
    /// Pointer to a constant, NUL-free string.
    CStr,
}

impl Type {
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int32 | Self::Int64 | Self::Double)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Void => "void",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::Double => "double",
            Self::Object => "object*",
            Self::CStr => "i8*",
        };
        f.write_str(name)
    }
}

/// SSA value local to one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl ValueId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FunctionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BlockId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int32(i32),
    Int64(i64),
    Double(f64),
    /// The null object reference.
    Null,
    Str(Arc<str>),
}

impl Constant {
    pub fn ty(&self) -> Type {
        match self {
            Self::Int32(_) => Type::Int32,
            Self::Int64(_) => Type::Int64,
            Self::Double(_) => Type::Double,
            Self::Null => Type::Object,
            Self::Str(_) => Type::CStr,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(ValueId),
    Const(Constant),
    /// The n-th incoming argument of the enclosing function.
    Argument(u16),
}

impl Operand {
    pub fn null() -> Self {
        Self::Const(Constant::Null)
    }

    pub fn as_value(&self) -> Option<ValueId> {
        match self {
            Self::Value(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<ValueId> for Operand {
    fn from(value: ValueId) -> Self {
        Self::Value(value)
    }
}

impl From<Constant> for Operand {
    fn from(value: Constant) -> Self {
        Self::Const(value)
    }
}
