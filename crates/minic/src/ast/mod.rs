//! Abstract Syntax Tree definitions

mod node;
mod dump;

pub use node::{Node, NodeKind, PreOrder};
pub use dump::dump;
