/*!
## Rust Machine Module

This Rust module is the bytecode format and virtual machine for rules,
along with the dynamic values and the symbol table they operate on.

*/

pub type Address = usize;

mod function;
pub mod link;
mod listing;
mod opcode;
mod operation;
mod program;
mod runtime;
mod stack;
mod val;
mod var;

pub use function::{Function, MemoryPrices, Price, PriceSource};
pub use link::{fixup, Label, Link};
pub use listing::Listing;
pub use opcode::Opcode;
pub use operation::Operation;
pub use program::Program;
pub use runtime::{Runtime, Slot};
pub use stack::Stack;
pub use val::{parse_datetime, Value, ValueType};
pub use var::{Role, Row, Symbol, SymbolTable};
