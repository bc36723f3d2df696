/// Lexer for the C-like surface syntax.
///
/// [`Lexer`] implements [`Iterator`] over [`Token`]s and yields exactly one
/// [`TokenKind::Eof`] at the end of input. Malformed input becomes a
/// [`TokenKind::Error`] token instead of aborting, so the parser decides how
/// to report it.
///
/// | Syntax      | Meaning                          |
/// |-------------|----------------------------------|
/// | `// …`      | Line comment, skipped            |
/// | `"…"`       | String, escapes `\n \t \\ \"`    |
/// | `1`, `1.5`  | Integer and float literals       |
use crate::span::{Pos, Span};
use crate::token::{Token, TokenKind};

pub struct Lexer<'src> {
    src: &'src [u8],
    offset: usize,
    pos: Pos,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            src: source.as_bytes(),
            offset: 0,
            pos: Pos::ORIGIN,
            finished: false,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(source: &'src str) -> Self {
        Self::new(source)
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.get(self.offset).copied()
    }

    #[inline]
    fn peek_ahead(&self, n: usize) -> Option<u8> {
        self.src.get(self.offset + n).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.offset += 1;
        self.pos = if c == b'\n' {
            self.pos.next_line()
        } else {
            self.pos.next_column()
        };
        Some(c)
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.advance();
                }
                Some(b'/') if self.peek_ahead(1) == Some(b'/') => {
                    while !matches!(self.peek(), None | Some(b'\n')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn text(&self, start: usize) -> &'src str {
        // only ever sliced on ASCII boundaries
        std::str::from_utf8(&self.src[start..self.offset])
            .unwrap_or_default()
    }

    fn lex_number(&mut self, start: usize) -> TokenKind {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some(b'.')
            && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let digit_at = match self.peek_ahead(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                is_float = true;
                for _ in 0..digit_at {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = self.text(start);
        if is_float {
            match text.parse::<f64>() {
                Ok(value) => TokenKind::Float(value),
                Err(err) => TokenKind::Error(format!("invalid float {text}: {err}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => TokenKind::Integer(value),
                Err(err) => {
                    TokenKind::Error(format!("invalid integer {text}: {err}"))
                }
            }
        }
    }

    fn lex_string(&mut self) -> TokenKind {
        // opening quote
        self.advance();
        let mut bytes = Vec::new();
        loop {
            match self.advance() {
                None => return TokenKind::Error("unterminated string".into()),
                Some(b'"') => break,
                Some(b'\\') => {
                    let escaped = match self.advance() {
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',
                        Some(b'\\') => b'\\',
                        Some(b'"') => b'"',
                        Some(other) => {
                            return TokenKind::Error(format!(
                                "unknown escape \\{}",
                                other as char
                            ));
                        }
                        None => {
                            return TokenKind::Error("unterminated string".into());
                        }
                    };
                    bytes.push(escaped);
                }
                Some(c) => bytes.push(c),
            }
        }
        match String::from_utf8(bytes) {
            Ok(value) => TokenKind::String(value),
            Err(_) => TokenKind::Error("string is not valid utf-8".into()),
        }
    }

    fn lex_identifier(&mut self, start: usize) -> TokenKind {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        TokenKind::Identifier(self.text(start).to_owned())
    }

    /// One- or two-character punctuation.
    fn lex_punct(&mut self, c: u8) -> TokenKind {
        self.advance();
        let followed_by_eq = self.peek() == Some(b'=');
        let kind = match c {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b';' => TokenKind::Semicolon,
            b'=' if followed_by_eq => TokenKind::EqualEqual,
            b'=' => return TokenKind::Assign,
            b'!' if followed_by_eq => TokenKind::NotEqual,
            b'<' if followed_by_eq => TokenKind::LessEqual,
            b'<' => return TokenKind::Less,
            b'>' if followed_by_eq => TokenKind::GreaterEqual,
            b'>' => return TokenKind::Greater,
            other => {
                return TokenKind::Error(format!(
                    "unexpected character {:?}",
                    other as char
                ));
            }
        };
        if matches!(
            kind,
            TokenKind::EqualEqual
                | TokenKind::NotEqual
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
        ) {
            self.advance();
        }
        kind
    }

    fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.pos;
        let start_offset = self.offset;
        let kind = match self.peek() {
            None => TokenKind::Eof,
            Some(c) if c.is_ascii_digit() => self.lex_number(start_offset),
            Some(b'"') => self.lex_string(),
            Some(c) if c.is_ascii_alphabetic() || c == b'_' => {
                self.lex_identifier(start_offset)
            }
            Some(c) if c.is_ascii() => self.lex_punct(c),
            Some(_) => {
                // skip the whole non-ASCII character
                self.advance();
                while self.peek().is_some_and(|c| c & 0xC0 == 0x80) {
                    self.advance();
                }
                TokenKind::Error("unexpected non-ASCII character".into())
            }
        };
        Token::new(kind, Span::new(start, self.pos))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::from_str(src).map(|t| t.kind).collect()
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    #[test]
    fn declaration_with_initializer() {
        assert_eq!(
            kinds("int x = 5;"),
            vec![
                ident("int"),
                ident("x"),
                TokenKind::Assign,
                TokenKind::Integer(5),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn dotted_reference_and_float() {
        assert_eq!(
            kinds("a.b.c = 2.5"),
            vec![
                ident("a"),
                TokenKind::Dot,
                ident("b"),
                TokenKind::Dot,
                ident("c"),
                TokenKind::Assign,
                TokenKind::Float(2.5),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(
            kinds("== != < <= > >="),
            vec![
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("x // the rest\ny"),
            vec![ident("x"), ident("y"), TokenKind::Eof]
        );
    }

    #[test]
    fn strings_resolve_escapes() {
        assert_eq!(
            kinds(r#""a\n\"b\"""#),
            vec![TokenKind::String("a\n\"b\"".into()), TokenKind::Eof]
        );
        assert!(matches!(
            kinds("\"open")[0],
            TokenKind::Error(ref msg) if msg == "unterminated string"
        ));
    }

    #[test]
    fn exponent_floats() {
        assert_eq!(kinds("1e3")[0], TokenKind::Float(1000.0));
        assert_eq!(kinds("2.5E-1")[0], TokenKind::Float(0.25));
    }

    #[test]
    fn integer_overflow_is_an_error_token() {
        assert!(matches!(
            kinds("99999999999999999999")[0],
            TokenKind::Error(_)
        ));
    }

    #[test]
    fn spans_track_lines() {
        let tokens: Vec<_> = Lexer::from_str("x\n  y").collect();
        assert_eq!(tokens[1].span.start, Pos::new(2, 3));
        assert_eq!(tokens[1].span.end, Pos::new(2, 4));
    }

    #[test]
    fn lone_bang_is_an_error() {
        assert!(matches!(kinds("!")[0], TokenKind::Error(_)));
    }
}
