use std::collections::VecDeque;

use crate::ast::{
    BinaryOperator, Block, Expr, FunctionDeclaration, Identifier, Reference,
    Stmt, VariableDeclaration,
};
use crate::span::Span;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Recursive-descent parser producing one top-level [`Stmt`] per iteration.
///
/// Iteration stops after the first error.
pub struct Parser<I: Iterator<Item = Token>> {
    tokens: I,
    lookahead: VecDeque<Token>,
    last_span: Span,
    failed: bool,
}

fn binary_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        TokenKind::EqualEqual => BinaryOperator::Equal,
        TokenKind::NotEqual => BinaryOperator::NotEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessEqual,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
        _ => return None,
    };
    Some(op)
}

fn precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Equal
        | BinaryOperator::NotEqual
        | BinaryOperator::Less
        | BinaryOperator::LessEqual
        | BinaryOperator::Greater
        | BinaryOperator::GreaterEqual => 1,
        BinaryOperator::Add | BinaryOperator::Sub => 2,
        BinaryOperator::Mul | BinaryOperator::Div => 3,
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            lookahead: VecDeque::new(),
            last_span: Span::default(),
            failed: false,
        }
    }

    fn fill(&mut self, n: usize) {
        while self.lookahead.len() <= n {
            let token = self
                .tokens
                .next()
                .unwrap_or_else(|| Token::new(TokenKind::Eof, self.last_span));
            self.lookahead.push_back(token);
        }
    }

    fn peek_token(&mut self, n: usize) -> &Token {
        self.fill(n);
        &self.lookahead[n]
    }

    fn peek_nth(&mut self, n: usize) -> &TokenKind {
        &self.peek_token(n).kind
    }

    /// `type name` with both names on one line. Two names split by a line
    /// break are two expression statements.
    fn at_declaration(&mut self) -> bool {
        let ty = self.peek_token(0).clone();
        let name = self.peek_token(1);
        matches!(ty.kind, TokenKind::Identifier(_))
            && matches!(name.kind, TokenKind::Identifier(_))
            && ty.span.continues_on(name.span)
    }

    fn peek_kind(&mut self) -> &TokenKind {
        self.peek_nth(0)
    }

    fn at(&mut self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    fn advance(&mut self) -> Token {
        self.fill(0);
        let token = self
            .lookahead
            .pop_front()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, self.last_span));
        self.last_span = token.span;
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(token: &Token, expected: &str) -> ParseError {
        match &token.kind {
            TokenKind::Error(message) => ParseError::new(message.clone(), token.span),
            kind => ParseError::new(
                format!("expected {expected}, found {}", kind.name()),
                token.span,
            ),
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        let token = self.advance();
        if std::mem::discriminant(&token.kind) == std::mem::discriminant(kind) {
            Ok(token)
        } else {
            Err(Self::unexpected(&token, kind.name()))
        }
    }

    fn expect_identifier(&mut self, what: &str) -> Result<Identifier, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Identifier(name) => Ok(Identifier::new(name, token.span)),
            _ => Err(Self::unexpected(&token, what)),
        }
    }

    pub fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let is_block = self.at(&TokenKind::LBrace);
        let is_declaration = self.at_declaration();

        let stmt = if is_block {
            Stmt::Block(self.parse_block()?)
        } else if is_declaration {
            self.parse_declaration()?
        } else {
            Stmt::Expression(self.parse_expr()?)
        };
        while self.eat(&TokenKind::Semicolon) {}
        Ok(stmt)
    }

    fn parse_declaration(&mut self) -> Result<Stmt, ParseError> {
        let ty = self.expect_identifier("a type name")?;
        let name = self.expect_identifier("a name")?;

        if !self.eat(&TokenKind::LParen) {
            let initializer = if self.eat(&TokenKind::Assign) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(Stmt::VariableDeclaration(VariableDeclaration {
                ty,
                name,
                initializer,
            }));
        }

        let mut parameters = Vec::new();
        if !self.eat(&TokenKind::RParen) {
            loop {
                let ty = self.expect_identifier("a parameter type")?;
                let name = self.expect_identifier("a parameter name")?;
                parameters.push(VariableDeclaration {
                    ty,
                    name,
                    initializer: None,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
            self.expect(&TokenKind::RParen)?;
        }
        let body = self.parse_block()?;
        Ok(Stmt::FunctionDeclaration(FunctionDeclaration {
            return_type: ty,
            name,
            parameters,
            body,
        }))
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let open = self.expect(&TokenKind::LBrace)?;
        let mut statements = Vec::new();
        loop {
            if self.eat(&TokenKind::RBrace) {
                return Ok(Block::new(statements));
            }
            if self.at(&TokenKind::Eof) {
                return Err(ParseError::new("unclosed block", open.span));
            }
            statements.push(self.parse_statement()?);
        }
    }

    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        let lhs = self.parse_binary(1)?;
        if !self.at(&TokenKind::Assign) {
            return Ok(lhs);
        }
        let assign = self.advance();
        let target = match lhs {
            Expr::Reference(reference) => reference,
            Expr::Identifier(ident) => Reference::single(ident),
            _ => {
                return Err(ParseError::new("invalid assignment target", assign.span));
            }
        };
        // right associative: a = b = 1
        let value = self.parse_expr()?;
        Ok(Expr::Assignment {
            target,
            value: Box::new(value),
        })
    }

    /// Precedence climbing over left-associative binary operators.
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = binary_operator(self.peek_kind()) {
            let prec = precedence(op);
            if prec < min_precedence {
                break;
            }
            let token = self.advance();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span: token.span,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if !self.at(&TokenKind::Minus) {
            return self.parse_primary();
        }
        let minus = self.advance();
        let operand = self.parse_unary()?;
        Ok(match operand {
            Expr::Integer(value) => Expr::Integer(value.wrapping_neg()),
            Expr::Double(value) => Expr::Double(-value),
            operand => Expr::Binary {
                op: BinaryOperator::Sub,
                lhs: Box::new(Expr::Integer(0)),
                rhs: Box::new(operand),
                span: minus.span,
            },
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Integer(value) => Ok(Expr::Integer(value)),
            TokenKind::Float(value) => Ok(Expr::Double(value)),
            TokenKind::String(value) => Ok(Expr::String(value)),
            TokenKind::Identifier(name) => {
                let first = Identifier::new(name, token.span);
                if self.eat(&TokenKind::LParen) {
                    let arguments = self.parse_arguments()?;
                    return Ok(Expr::Call {
                        callee: first,
                        arguments,
                    });
                }
                let mut rest = Vec::new();
                while self.eat(&TokenKind::Dot) {
                    rest.push(self.expect_identifier("a slot name")?);
                }
                let reference = Reference::new(first, rest);
                if self.at(&TokenKind::LParen) {
                    return Err(ParseError::new(
                        format!("cannot call `{reference}`: only function names are callable"),
                        reference.span(),
                    ));
                }
                Ok(Expr::Reference(reference))
            }
            TokenKind::LParen => {
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            _ => Err(Self::unexpected(&token, "an expression")),
        }
    }

    /// Arguments after the opening parenthesis, through the closing one.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut arguments = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(arguments)
    }
}

impl<I: Iterator<Item = Token>> Iterator for Parser<I> {
    type Item = Result<Stmt, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while self.eat(&TokenKind::Semicolon) {}
        if self.at(&TokenKind::Eof) {
            return None;
        }
        let result = self.parse_statement();
        self.failed = result.is_err();
        Some(result)
    }
}
