//! Common infrastructure shared by the lexer, parser and driver

mod error;
mod span;

pub use error::{CompileError, CompileResult, DiagnosticReporter};
pub use span::{LineIndex, Position, Span};
