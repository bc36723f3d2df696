/// Abstract syntax tree consumed by the code generator.
///
/// A program is a [`Block`] of [`Stmt`]s. Names used as values are
/// [`Reference`]s: a non-empty chain of identifiers such as `a.b.c`.
use std::fmt;

use crate::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A dotted chain of names such as `a.b.c`. Always holds at least one name.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    head: Identifier,
    rest: Vec<Identifier>,
}

impl Reference {
    pub fn new(head: Identifier, rest: Vec<Identifier>) -> Self {
        Self { head, rest }
    }

    pub fn single(ident: Identifier) -> Self {
        Self::new(ident, Vec::new())
    }

    /// `None` for an empty chain.
    pub fn from_segments(segments: Vec<Identifier>) -> Option<Self> {
        let mut segments = segments.into_iter();
        let head = segments.next()?;
        Some(Self::new(head, segments.collect()))
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        self.rest.is_empty()
    }

    #[inline]
    pub fn first(&self) -> &Identifier {
        &self.head
    }

    /// The names after the first one.
    #[inline]
    pub fn rest(&self) -> &[Identifier] {
        &self.rest
    }

    pub fn last(&self) -> &Identifier {
        self.rest.last().unwrap_or(&self.head)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Identifier> {
        std::iter::once(&self.head).chain(&self.rest)
    }

    pub fn span(&self) -> Span {
        self.first().span.to(self.last().span)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.head.name)?;
        for segment in &self.rest {
            write!(f, ".{}", segment.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Double(f64),
    String(String),
    Identifier(Identifier),
    Reference(Reference),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        /// Span of the operator token.
        span: Span,
    },
    Assignment {
        target: Reference,
        value: Box<Expr>,
    },
    Call {
        callee: Identifier,
        arguments: Vec<Expr>,
    },
}

/// `type name` or `type name = initializer`. Also used for parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub ty: Identifier,
    pub name: Identifier,
    pub initializer: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub return_type: Identifier,
    pub name: Identifier,
    pub parameters: Vec<VariableDeclaration>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(Expr),
    VariableDeclaration(VariableDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    Block(Block),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

impl Block {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, Span::default())
    }

    #[test]
    fn empty_chain_is_not_a_reference() {
        assert!(Reference::from_segments(Vec::new()).is_none());
    }

    #[test]
    fn single_name_is_first_and_last() {
        let reference = Reference::single(ident("a"));
        assert!(reference.is_single());
        assert_eq!(reference.first(), reference.last());
        assert!(reference.rest().is_empty());
    }

    #[test]
    fn chain_display() {
        let reference =
            Reference::from_segments(vec![ident("a"), ident("b"), ident("c")]).unwrap();
        assert_eq!(reference.to_string(), "a.b.c");
        assert_eq!(reference.last().name, "c");
        assert_eq!(reference.segments().count(), 3);
    }
}
