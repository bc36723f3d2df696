//! # Parser
//!
//! Lexer and recursive-descent parser for the surface language.
//!
//! ```text
//!  &str ──▶ Lexer ──Token stream──▶ Parser ──Stmt stream──▶ ast::Block
//! ```
//!
//! ```rust
//! use parser::{Lexer, Parser};
//!
//! let source = "int x = 5\nx = x + 1";
//! for result in Parser::new(Lexer::from_str(source)) {
//!     match result {
//!         Ok(stmt) => println!("{stmt:?}"),
//!         Err(err) => eprintln!("parse error: {err}"),
//!     }
//! }
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{
    BinaryOperator, Block, Expr, FunctionDeclaration, Identifier, Reference,
    Stmt, VariableDeclaration,
};
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use span::{Pos, Span};
pub use token::{Token, TokenKind};

/// Parse a whole program into its root block.
pub fn parse_program(source: &str) -> Result<Block, ParseError> {
    Parser::new(Lexer::from_str(source))
        .collect::<Result<Vec<_>, _>>()
        .map(Block::new)
}
