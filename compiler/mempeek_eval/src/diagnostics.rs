//! Conversion of failures into one-line diagnostics.

use mempeek_diagnostic::{Diagnostic, ErrorCode};

use crate::errors::{CompileError, CompileErrorKind, RuntimeError, RuntimeErrorKind};

impl CompileErrorKind {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CompileErrorKind::NamingConflict { .. } => ErrorCode::E1001,
            CompileErrorKind::UndefinedVariable { .. } => ErrorCode::E1002,
            CompileErrorKind::NonConstExpression => ErrorCode::E1003,
            CompileErrorKind::MappingFailure { .. } => ErrorCode::E1004,
            CompileErrorKind::ConstDivisionByZero => ErrorCode::E1005,
            CompileErrorKind::UndefinedSubroutine { .. } => ErrorCode::E1006,
            CompileErrorKind::ArgumentCount { .. } => ErrorCode::E1007,
            CompileErrorKind::InvalidLiteral { .. } => ErrorCode::E1008,
            CompileErrorKind::InvalidFormat { .. } => ErrorCode::E1009,
            CompileErrorKind::NestedSubroutine { .. } => ErrorCode::E1010,
            CompileErrorKind::ConstEvaluation { .. } => ErrorCode::E1011,
            CompileErrorKind::InvalidLoopInit => ErrorCode::E1012,
        }
    }
}

impl RuntimeErrorKind {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RuntimeErrorKind::DivisionByZero => ErrorCode::E2001,
            RuntimeErrorKind::ModuloByZero => ErrorCode::E2002,
            RuntimeErrorKind::NoMapping { .. } => ErrorCode::E2003,
            RuntimeErrorKind::BusError { .. } => ErrorCode::E2004,
            RuntimeErrorKind::SubroutineUnavailable { .. } => ErrorCode::E2005,
        }
    }
}

impl CompileError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.kind.error_code())
            .with_message(self.kind.to_string())
            .with_location(self.location.clone());
        match &self.kind {
            CompileErrorKind::ConstDivisionByZero => {
                diag.with_note("the expression is evaluated when the script is loaded")
            }
            _ => diag,
        }
    }
}

impl RuntimeError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind.error_code())
            .with_message(self.kind.to_string())
            .with_location(self.location.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{naming_conflict, no_mapping};
    use mempeek_ir::{AccessSize, Location};
    use pretty_assertions::assert_eq;

    #[test]
    fn runtime_diagnostic_line() {
        let err = no_mapping(0x1000, AccessSize::Bits32, &Location::new("gpio.mp", 4, 2));
        assert_eq!(
            err.to_diagnostic().to_string(),
            "gpio.mp:4:2: error[E2003]: no mapping for 4 bytes at 0x1000"
        );
    }

    #[test]
    fn compile_diagnostic_line() {
        let err = naming_conflict("BASE", &Location::new("soc.mp", 12, 1));
        let diag = err.to_diagnostic();
        assert!(diag.code.is_compile_error());
        assert_eq!(
            diag.to_string(),
            "soc.mp:12:1: error[E1001]: naming conflict: BASE"
        );
    }

    #[test]
    fn const_division_has_note() {
        let err = CompileError::new(CompileErrorKind::ConstDivisionByZero, Location::unknown());
        assert_eq!(err.to_diagnostic().notes.len(), 1);
    }

    #[test]
    fn terminal_emitter_prints_note_lines() {
        use mempeek_diagnostic::emitter::{DiagnosticEmitter, TerminalEmitter};

        let err = CompileError::new(
            CompileErrorKind::ConstDivisionByZero,
            Location::new("soc.mp", 3, 9),
        );
        let mut emitter = TerminalEmitter::new(Vec::new(), false);
        emitter.emit(&err.to_diagnostic());
        let out = String::from_utf8(emitter.into_inner()).unwrap_or_default();
        assert_eq!(
            out,
            "soc.mp:3:9: error[E1005]: division by zero in constant expression\n  \
             = note: the expression is evaluated when the script is loaded\n"
        );
    }
}
