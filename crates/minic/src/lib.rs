//! MiniC - lexer and recursive descent parser for a small C-like language
//!
//! The front end is organized into:
//! - **Lexer** (`lexer/`): source text to a token sequence ending in `end_of_file`
//! - **Parser** (`parser/`): tokens to a generic syntax tree, collecting diagnostics
//! - **AST** (`ast/`): the tree itself and its indented text dump
//! - **Common** (`common/`): spans, positions, errors and diagnostic rendering
//! - **Driver** (`driver/`): runs both phases and decides the verdict

pub mod ast;
pub mod common;
pub mod driver;
pub mod lexer;
pub mod parser;

// Re-exports for convenience
pub use ast::{Node, NodeKind};
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::{DriverConfig, Outcome, Pipeline};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseOutput, Parser};
