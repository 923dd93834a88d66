//! Lexer implementation using logos

use super::token::{Token, TokenKind};
use crate::common::{CompileError, LineIndex, Position, Span};
use logos::Logos;

/// Tokens produced by one scan, plus every lexical error met on the way
#[derive(Debug)]
pub struct Lexed {
    /// Always ends with exactly one [`TokenKind::Eof`]
    pub tokens: Vec<Token>,
    pub errors: Vec<CompileError>,
}

impl Lexed {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Lexer for source code
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    lines: LineIndex,
    errors: Vec<CompileError>,
    at_eof: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            lines: LineIndex::new(source),
            errors: Vec::new(),
            at_eof: false,
        }
    }

    /// Get the source being lexed
    pub fn source(&self) -> &'a str {
        self.inner.source()
    }

    fn position(&self, offset: usize) -> Position {
        self.lines.position(self.source(), offset)
    }

    fn eof_token(&self) -> Token {
        let len = self.source().len();
        let pos = self.position(len);
        Token::new(TokenKind::Eof, "EOF", pos.line, pos.column, Span::new(len, len))
    }

    /// Get the next token.
    ///
    /// Never fails: unexpected characters are recorded and skipped, and an
    /// unterminated string literal is recorded and ends the scan.
    pub fn next_token(&mut self) -> Token {
        if self.at_eof {
            return self.eof_token();
        }

        loop {
            match self.inner.next() {
                Some(Ok(kind)) => {
                    let span = Span::from(self.inner.span());
                    let slice = self.inner.slice();
                    let lexeme = if kind == TokenKind::StringLiteral {
                        &slice[1..slice.len() - 1]
                    } else {
                        slice
                    };
                    let pos = self.position(span.start);
                    return Token::new(kind, lexeme, pos.line, pos.column, span);
                }
                Some(Err(())) => {
                    let span = Span::from(self.inner.span());
                    let pos = self.position(span.start);

                    if self.inner.slice().starts_with('"') {
                        self.errors.push(CompileError::lexer(
                            "unterminated string literal",
                            span,
                            pos,
                        ));
                        self.at_eof = true;
                        return self.eof_token();
                    }

                    // A char split across error spans is reported once, at its first byte
                    if let Some(c) = self.source().get(span.start..).and_then(|s| s.chars().next()) {
                        self.errors.push(CompileError::lexer(
                            format!("unexpected character '{}'", c.escape_default()),
                            Span::new(span.start, span.start + c.len_utf8()),
                            pos,
                        ));
                    }
                }
                None => {
                    self.at_eof = true;
                    return self.eof_token();
                }
            }
        }
    }

    /// Tokenize the entire source
    pub fn tokenize_all(mut self) -> Lexed {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is(TokenKind::Eof);
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Lexed {
            tokens,
            errors: self.errors,
        }
    }
}

/// Scan `source` into a token sequence
pub fn scan(source: &str) -> Lexed {
    Lexer::new(source).tokenize_all()
}
