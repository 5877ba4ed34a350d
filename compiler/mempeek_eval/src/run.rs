//! Top-level program execution.

use tracing::{debug, info_span};

use crate::environment::Environment;
use crate::errors::{ControlAction, RuntimeError, Signal};
use crate::node::Node;

/// How a run ended without a failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The root ran to its end, or left it with `exit`/`break`.
    Completed,
    /// `quit` was executed.
    Quit,
    /// A stop was requested through the environment's stop flag.
    Terminated,
}

/// Execute a script's root node.
///
/// The root's value is discarded. Signals that reach the top level are
/// turned into a [`RunOutcome`]; run-time failures are returned as is.
pub fn run(root: &Node, env: &Environment) -> Result<RunOutcome, RuntimeError> {
    let _span = info_span!("run", location = %root.location()).entered();
    let outcome = match root.execute(env) {
        Ok(_) | Err(ControlAction::Signal(Signal::Exit | Signal::Break)) => RunOutcome::Completed,
        Err(ControlAction::Signal(Signal::Quit)) => RunOutcome::Quit,
        Err(ControlAction::Signal(Signal::Terminate)) => RunOutcome::Terminated,
        Err(ControlAction::Error(err)) => {
            debug!(error = %err, "run failed");
            return Err(err);
        }
    };
    debug!(?outcome, "run finished");
    Ok(outcome)
}
