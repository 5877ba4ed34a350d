//! Diagnostic system for mempeek scripts.
//!
//! Every failure raised while building or running a script is turned into a
//! [`Diagnostic`] carrying:
//! - an error code for searchability (`E1xxx` construction, `E2xxx` run time)
//! - the source location
//! - a one-line message naming the offending address, size or name
//!
//! Diagnostics render as a single line, `file:line:col: error[E2002]: ...`,
//! followed by optional notes.

mod diagnostic;
pub mod emitter;
mod error_code;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
