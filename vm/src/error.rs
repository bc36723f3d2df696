use ir::{IrError, Type};
use object::ObjectError;
use parser::{BinaryOperator, ParseError, Span};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodegenError {
    #[error("{span}: unsupported operator `{op}`")]
    UnsupportedOperator { op: BinaryOperator, span: Span },
    #[error("{span}: unknown type `{name}`")]
    UnknownType { name: String, span: Span },
    #[error("{span}: `{name}` cannot have type void")]
    VoidVariable { name: String, span: Span },
    #[error("{span}: cannot assign to `{target}`")]
    InvalidAssignment { target: String, span: Span },
    #[error("{span}: function `{name}` must end with a {ty} value")]
    MissingReturnValue { name: String, ty: Type, span: Span },
    #[error("{span}: function `{name}` is already declared")]
    DuplicateFunction { name: String, span: Span },
    #[error("{span}: `{name}` holds {expected}, cannot store {found}")]
    TypeMismatch {
        name: String,
        expected: Type,
        found: Type,
        span: Span,
    },
    #[error("no active scope to emit into")]
    NoActiveScope,
    #[error(transparent)]
    Ir(#[from] IrError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    #[error("module has no entry routine `{0}`")]
    MissingEntry(String),
    #[error("no primitive provides external function `{0}`")]
    UnknownPrimitive(String),
    #[error("no function named `{0}`")]
    UnknownFunction(String),
    #[error("call to unresolved function `{0}`")]
    UnresolvedCall(String),
    #[error("`{function}` expects {expected} arguments, got {found}")]
    ArgumentCount {
        function: String,
        expected: usize,
        found: usize,
    },
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },
    #[error("cannot put slot `{0}` on null")]
    NullReceiver(String),
    #[error("integer division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    IntegerOverflow,
    #[error("call depth exceeded {0} frames")]
    StackOverflow(usize),
    #[error("malformed code in `{function}`: {message}")]
    Malformed { function: String, message: String },
    #[error("output failed: {0}")]
    Output(String),
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// Anything that can go wrong turning source text into a module.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("codegen error: {0}")]
    Codegen(#[from] CodegenError),
}
