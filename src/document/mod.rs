//! Generic attributed document tree.
//!
//! Turns raw markup into [`Node`]s so the gesture mapping never touches the
//! XML backend directly.

pub mod parser;
pub mod tree;

pub use parser::{DocumentError, parse_file, parse_str};
pub use tree::Node;
