//! Read-only cursor over a token sequence

use crate::common::Span;
use crate::lexer::{Token, TokenKind};

/// Saved cursor position. Only [`Cursor::restore`] can rewind to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

#[derive(Debug)]
pub struct Cursor<'a> {
    tokens: &'a [Token],
    position: usize,
    /// Index of the first end-of-file token, or `tokens.len()` if missing
    end: usize,
    eof: Token,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens
            .iter()
            .position(|t| t.is(TokenKind::Eof))
            .unwrap_or(tokens.len());
        let eof = tokens.get(end).cloned().unwrap_or_else(|| {
            let (offset, line, column) = tokens.last().map_or((0, 1, 1), |t| {
                (t.span.end, t.line, t.column + t.lexeme.chars().count())
            });
            Token::new(TokenKind::Eof, "EOF", line, column, Span::new(offset, offset))
        });
        Self {
            tokens,
            position: 0,
            end,
            eof,
        }
    }

    /// Current token; the end-of-file token once everything is consumed
    pub fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    pub fn peek_nth(&self, n: usize) -> &Token {
        let index = self.position + n;
        if index < self.end {
            &self.tokens[index]
        } else {
            &self.eof
        }
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.peek().is(kind)
    }

    /// Consume the current token. Never moves past end of file.
    pub fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.end {
            self.position += 1;
        }
        token
    }

    pub fn bump_if(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.bump())
        } else {
            None
        }
    }

    pub fn at_end(&self) -> bool {
        self.position >= self.end
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Index of the trailing end-of-file token
    pub fn end_index(&self) -> usize {
        self.end
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.position)
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.position = checkpoint.0;
    }
}
