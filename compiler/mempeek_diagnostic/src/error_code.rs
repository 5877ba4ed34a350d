use std::fmt;

/// Error codes for all mempeek diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E1xxx: Construction-time (compile) errors, raised while a script is built
/// - E2xxx: Run-time errors, raised while a script executes
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Construction Errors (E1xxx)
    /// Name already declared in a conflicting form
    E1001,
    /// Reference to an undefined variable
    E1002,
    /// Constant expression required
    E1003,
    /// Memory mapping could not be registered
    E1004,
    /// Division by zero while folding a constant expression
    E1005,
    /// Call of an undefined subroutine
    E1006,
    /// Argument count does not match the subroutine's parameters
    E1007,
    /// Malformed numeric literal
    E1008,
    /// Invalid print format
    E1009,
    /// Subroutine defined inside another subroutine
    E1010,
    /// Constant expression failed to evaluate
    E1011,
    /// `for` loop not started by an assignment
    E1012,

    // Run-time Errors (E2xxx)
    /// Division by zero
    E2001,
    /// Modulo by zero
    E2002,
    /// No mapping covers the accessed range
    E2003,
    /// Access faulted inside a valid mapping
    E2004,
    /// Subroutine body has been released
    E2005,
}

impl ErrorCode {
    /// Check if this is a construction-time error (E1xxx range).
    pub fn is_compile_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    /// Check if this is a run-time error (E2xxx range).
    pub fn is_runtime_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Get the numeric code as a string (e.g., "E1001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E1010 => "E1010",
            ErrorCode::E1011 => "E1011",
            ErrorCode::E1012 => "E1012",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
