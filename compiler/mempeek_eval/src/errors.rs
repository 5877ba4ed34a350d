//! Control signals and failures raised while building or running a script.
//!
//! Three things can end the evaluation of a node early:
//! - a [`Signal`] (`break`, `exit`, `quit`, or a requested stop), which is
//!   caught by specific node kinds and is not an error
//! - a [`RuntimeError`], which propagates to the outermost driver
//! - during construction only, a [`CompileError`]
//!
//! `execute` returns [`EvalResult`]; signals and run-time failures travel
//! together in [`ControlAction`] so `?` unwinds both.

use std::fmt;

use mempeek_ir::{AccessSize, Location, Word};

/// Result of executing a node.
pub type EvalResult = Result<Word, ControlAction>;

/// Non-local control transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Leave the innermost `while`/`for` loop.
    Break,
    /// Leave the current subroutine call, import, or top-level script.
    Exit,
    /// End the program.
    Quit,
    /// A stop was requested from outside the tree.
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Break => write!(f, "break"),
            Signal::Exit => write!(f, "exit"),
            Signal::Quit => write!(f, "quit"),
            Signal::Terminate => write!(f, "terminate"),
        }
    }
}

/// Anything that unwinds evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlAction {
    Signal(Signal),
    Error(RuntimeError),
}

impl ControlAction {
    /// Whether this is `signal`.
    #[inline]
    pub fn is_signal(&self, signal: Signal) -> bool {
        matches!(self, ControlAction::Signal(s) if *s == signal)
    }
}

impl From<Signal> for ControlAction {
    fn from(signal: Signal) -> Self {
        ControlAction::Signal(signal)
    }
}

impl From<RuntimeError> for ControlAction {
    fn from(error: RuntimeError) -> Self {
        ControlAction::Error(error)
    }
}

// Run-time failures

/// Category of a run-time failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeErrorKind {
    #[error("division by zero")]
    DivisionByZero,

    #[error("modulo by zero")]
    ModuloByZero,

    #[error("no mapping for {} bytes at {address:#x}", .size.bytes())]
    NoMapping { address: Word, size: AccessSize },

    #[error("bus error accessing {} bytes at {address:#x}", .size.bytes())]
    BusError { address: Word, size: AccessSize },

    #[error("subroutine {name} is no longer available")]
    SubroutineUnavailable { name: String },
}

/// A failure while executing a script.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub location: Location,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, location: Location) -> Self {
        RuntimeError { kind, location }
    }
}

#[cold]
pub fn division_by_zero(location: &Location) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::DivisionByZero, location.clone())
}

#[cold]
pub fn modulo_by_zero(location: &Location) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::ModuloByZero, location.clone())
}

#[cold]
pub fn no_mapping(address: Word, size: AccessSize, location: &Location) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::NoMapping { address, size }, location.clone())
}

#[cold]
pub fn bus_error(address: Word, size: AccessSize, location: &Location) -> RuntimeError {
    RuntimeError::new(RuntimeErrorKind::BusError { address, size }, location.clone())
}

#[cold]
pub fn subroutine_unavailable(name: &str, location: &Location) -> RuntimeError {
    RuntimeError::new(
        RuntimeErrorKind::SubroutineUnavailable {
            name: name.to_string(),
        },
        location.clone(),
    )
}

// Construction failures

/// Category of a construction-time failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileErrorKind {
    #[error("naming conflict: {name}")]
    NamingConflict { name: String },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("constant expression required")]
    NonConstExpression,

    #[error("failed to map {len:#x} bytes at {phys:#x} from {device}: {reason}")]
    MappingFailure {
        phys: Word,
        len: Word,
        device: String,
        reason: String,
    },

    #[error("division by zero in constant expression")]
    ConstDivisionByZero,

    #[error("undefined subroutine: {name}")]
    UndefinedSubroutine { name: String },

    #[error("{name} expects {expected} arguments, got {got}")]
    ArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("{message}")]
    InvalidLiteral { message: String },

    #[error("float format requires 64 bits, got {size}")]
    InvalidFormat { size: AccessSize },

    #[error("subroutine {name} cannot be defined inside another subroutine")]
    NestedSubroutine { name: String },

    #[error("constant expression failed: {message}")]
    ConstEvaluation { message: String },

    #[error("for loop must start with an assignment to the loop variable")]
    InvalidLoopInit,
}

/// A failure while building a script.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{location}: {kind}")]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub location: Location,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, location: Location) -> Self {
        CompileError { kind, location }
    }
}

#[cold]
pub fn naming_conflict(name: &str, location: &Location) -> CompileError {
    CompileError::new(
        CompileErrorKind::NamingConflict {
            name: name.to_string(),
        },
        location.clone(),
    )
}

#[cold]
pub fn undefined_variable(name: &str, location: &Location) -> CompileError {
    CompileError::new(
        CompileErrorKind::UndefinedVariable {
            name: name.to_string(),
        },
        location.clone(),
    )
}

#[cold]
pub fn non_const_expression(location: &Location) -> CompileError {
    CompileError::new(CompileErrorKind::NonConstExpression, location.clone())
}

#[cold]
pub fn undefined_subroutine(name: &str, location: &Location) -> CompileError {
    CompileError::new(
        CompileErrorKind::UndefinedSubroutine {
            name: name.to_string(),
        },
        location.clone(),
    )
}

/// Reclassify a failure raised while folding a constant subtree.
///
/// Run-time failures keep the location of the node that raised them.
#[cold]
pub(crate) fn fold_failure(action: ControlAction, location: &Location) -> CompileError {
    match action {
        ControlAction::Error(RuntimeError { kind, location }) => {
            let kind = match kind {
                RuntimeErrorKind::DivisionByZero | RuntimeErrorKind::ModuloByZero => {
                    CompileErrorKind::ConstDivisionByZero
                }
                other => CompileErrorKind::ConstEvaluation {
                    message: other.to_string(),
                },
            };
            CompileError::new(kind, location)
        }
        ControlAction::Signal(signal) => CompileError::new(
            CompileErrorKind::ConstEvaluation {
                message: format!("unexpected {signal}"),
            },
            location.clone(),
        ),
    }
}
