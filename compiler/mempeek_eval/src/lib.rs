//! Mempeek Eval - tree-walking evaluator for mempeek register scripts.
//!
//! A script arrives as a tree of [`Node`]s built bottom-up by the grammar
//! layer through the constructors on `Node`. Construction resolves names
//! against an [`Environment`], folds constant subtrees and runs load-time
//! directives (`def`, `map`). [`run`] then executes the root.
//!
//! # Architecture
//!
//! - `Environment`: globals, per-subroutine frames, the subroutine registry,
//!   the mapping table, print handler and stop flag
//! - `Node::execute`: one flat node type with enum dispatch
//! - `evaluate_binary` / `evaluate_unary`: word operator semantics
//! - `ControlAction`: `break`/`exit`/`quit`/stop signals and run-time
//!   failures, propagated with `?`
//!
//! Register access goes through `mempeek_mmap`; failures render as
//! `mempeek_diagnostic` diagnostics.

mod diagnostics;
mod environment;
pub mod errors;
mod format;
mod node;
mod print_handler;
mod run;
mod stack;
mod stop;

#[cfg(test)]
mod tests;

use std::sync::Once;

pub use environment::{
    Environment, EnvironmentBuilder, Subroutine, SubroutineDefinition, VarKind, VarRef, Variable,
};
pub use errors::{
    // Run-time failures
    bus_error, division_by_zero, modulo_by_zero, no_mapping, subroutine_unavailable,
    // Construction failures
    naming_conflict, non_const_expression, undefined_subroutine, undefined_variable,
    // Types
    CompileError, CompileErrorKind, ControlAction, EvalResult, RuntimeError, RuntimeErrorKind,
    Signal,
};
pub use format::format_word;
pub use node::{evaluate_binary, evaluate_unary, Jump, Node, PrintItem};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};
pub use run::{run, RunOutcome};
pub use stack::ensure_sufficient_stack;
pub use stop::StopFlag;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=mempeek_eval=debug` or `RUST_LOG=mempeek_eval=trace`;
/// set `MEMPEEK_TRACE_TREE` for indented, span-nested output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        let registry = tracing_subscriber::registry().with(filter);
        let result = if std::env::var_os("MEMPEEK_TRACE_TREE").is_some() {
            registry
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .try_init()
        } else {
            registry
                .with(fmt::layer().with_target(true).with_level(true))
                .try_init()
        };
        // Another subscriber may already be installed by the embedding program.
        let _ = result;
    });
}
