//! # Rule
//!
//! A small language for business rules evaluated row by row.
//!
//! Rule text is scanned into tokens, parsed straight into a compact
//! bytecode buffer, then executed by a stack machine against a symbol
//! table of dynamically typed variables.
//!
//! ```
//! let mut runner = rule::Runner::new();
//! runner.compile_and_run("x = 6 - 4").unwrap();
//! assert_eq!(runner.value_string("x"), "2");
//! ```
//!
//! Programs are self-contained and may be compiled once then executed
//! many times, or joined together with [`mach::Program::concat`].

pub mod lang;
pub mod mach;
mod runner;

pub use runner::{Options, Runner};
