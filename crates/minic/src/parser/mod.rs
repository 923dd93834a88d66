//! Recursive descent parser

mod cursor;
mod expr;
#[allow(clippy::module_inception)]
mod parser;

pub use cursor::{Checkpoint, Cursor};
pub use parser::{parse_tokens, DeclarationForm, ParseOutput, Parser, MAX_NESTING};
