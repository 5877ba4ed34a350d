//! Diagnostic emitters.
//!
//! The terminal emitter writes each diagnostic as one line (plus notes),
//! optionally coloring the severity with ANSI escapes.

use std::io::{self, Write};

use crate::{Diagnostic, Severity};

/// ANSI color codes for terminal output.
mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const RESET: &str = "\x1b[0m";
}

/// Trait for emitting diagnostics.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Human-readable emitter with optional color support.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, colors: bool) -> Self {
        TerminalEmitter { writer, colors }
    }

    /// Consume the emitter and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn severity_color(severity: Severity) -> &'static str {
        match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        }
    }

    fn write_diagnostic(&mut self, diag: &Diagnostic) -> io::Result<()> {
        write!(self.writer, "{}: ", diag.location)?;
        if self.colors {
            write!(
                self.writer,
                "{}{}[{}]{}",
                Self::severity_color(diag.severity),
                diag.severity,
                diag.code,
                colors::RESET
            )?;
        } else {
            write!(self.writer, "{}[{}]", diag.severity, diag.code)?;
        }
        writeln!(self.writer, ": {}", diag.message)?;
        for note in &diag.notes {
            writeln!(self.writer, "  = note: {note}")?;
        }
        Ok(())
    }
}

impl TerminalEmitter<io::Stderr> {
    /// Emitter for stderr.
    pub fn stderr(colors: bool) -> Self {
        TerminalEmitter::new(io::stderr(), colors)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Nowhere left to report a failing diagnostic writer.
        let _ = self.write_diagnostic(diagnostic);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
