/*!
# Rust Language Module

This Rust module provides lexical analysis and parsing of the rule language.
The parser generates bytecode directly; there is no syntax tree.

*/

#[macro_use]
mod error;
mod admit;
mod parse;
mod scan;
pub mod token;

pub use admit::Admit;
pub use error::Error;
pub use error::ErrorCode;
pub use error::Position;
pub use parse::{parse, Mode};
pub use scan::scan;
