//! Mempeek IR - shared vocabulary of the mempeek script engine.
//!
//! This crate contains the plain data types that the grammar layer hands to
//! the evaluator:
//! - `Location` for diagnostics
//! - `Word`, the single value type flowing through evaluation
//! - `AccessSize` for sized register access and print formatting
//! - `BinaryOp` / `UnaryOp`
//! - `PrintFormat` descriptors
//! - literal parsing for integer and float constants

mod format;
mod literal;
mod location;
mod operators;
mod size;

pub use format::{FormatKind, PrintFormat};
pub use literal::{parse_float, parse_int, LiteralError};
pub use location::Location;
pub use operators::{BinaryOp, UnaryOp};
pub use size::{AccessSize, Word, FALSE, TRUE};
