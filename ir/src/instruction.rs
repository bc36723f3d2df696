use crate::{FunctionId, Operand, Type, ValueId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Function(FunctionId),
    /// A name no function was declared under. Never passes verification.
    Unresolved(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Reserve a named storage cell holding a value of type `ty`.
    Alloca { dst: ValueId, ty: Type, name: String },
    Load { dst: ValueId, cell: ValueId },
    Store { cell: ValueId, value: Operand },
    Binary {
        dst: ValueId,
        op: BinOp,
        lhs: Operand,
        rhs: Operand,
    },
    /// Wrap a scalar into a boxed Runtime Object.
    BoxValue { dst: ValueId, value: Operand },
    /// Integer value as another numeric type. Narrowing fails at run time
    /// when the value does not fit.
    Convert { dst: ValueId, value: Operand, to: Type },
    Call {
        dst: ValueId,
        callee: Callee,
        args: Vec<Operand>,
    },
    Return { value: Option<Operand> },
}

impl Instruction {
    #[inline]
    pub fn is_terminator(&self) -> bool {
        matches!(self, Self::Return { .. })
    }

    /// The value this instruction defines, if any.
    pub fn result(&self) -> Option<ValueId> {
        match self {
            Self::Alloca { dst, .. }
            | Self::Load { dst, .. }
            | Self::Binary { dst, .. }
            | Self::BoxValue { dst, .. }
            | Self::Convert { dst, .. }
            | Self::Call { dst, .. } => Some(*dst),
            Self::Store { .. } | Self::Return { .. } => None,
        }
    }

    /// Operands read by this instruction, in evaluation order.
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Self::Alloca { .. } | Self::Load { .. } => Vec::new(),
            Self::Store { value, .. }
            | Self::BoxValue { value, .. }
            | Self::Convert { value, .. } => vec![value],
            Self::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Self::Call { args, .. } => args.iter().collect(),
            Self::Return { value } => value.iter().collect(),
        }
    }
}
