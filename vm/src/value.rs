use std::{fmt, sync::Arc};

use ir::Type;
use object::ObjectRef;

use crate::RuntimeError;

/// A value as seen by running code: a raw scalar or an object reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Int(i64),
    Double(f64),
    Str(Arc<str>),
    /// `None` is the null reference.
    Object(Option<ObjectRef>),
}

impl Value {
    pub const NULL: Value = Value::Object(None);

    /// Initial contents of a fresh storage cell of type `ty`.
    pub fn zero(ty: Type) -> Self {
        match ty {
            Type::Int32 | Type::Int64 => Self::Int(0),
            Type::Double => Self::Double(0.0),
            Type::Object => Self::NULL,
            Type::CStr => Self::Str(Arc::from("")),
            Type::Void => Self::Void,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Int(_) => "integer",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
            Self::Object(None) => "null",
            Self::Object(Some(_)) => "object",
        }
    }

    pub fn as_object(&self) -> Result<Option<ObjectRef>, RuntimeError> {
        match self {
            Self::Object(obj) => Ok(*obj),
            other => Err(RuntimeError::TypeError {
                expected: "object",
                got: other.type_name(),
            }),
        }
    }

    pub fn as_int(&self) -> Result<i64, RuntimeError> {
        match self {
            Self::Int(value) => Ok(*value),
            other => Err(RuntimeError::TypeError {
                expected: "integer",
                got: other.type_name(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&str, RuntimeError> {
        match self {
            Self::Str(value) => Ok(value),
            other => Err(RuntimeError::TypeError {
                expected: "string",
                got: other.type_name(),
            }),
        }
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Self::Object(Some(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::Object(None) => f.write_str("null"),
            Self::Object(Some(obj)) => write!(f, "<object {obj}>"),
        }
    }
}
