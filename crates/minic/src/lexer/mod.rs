//! Lexer module for tokenizing source code

mod token;
mod scanner;

pub use token::{Token, TokenKind};
pub use scanner::{scan, Lexed, Lexer};
