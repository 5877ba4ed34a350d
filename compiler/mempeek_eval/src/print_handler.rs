//! Print handler for configurable output.
//!
//! `print` statements write through the environment's handler:
//! - Stdout (default), flushed after every statement
//! - Buffer for tests and embedding
//! - Silent to discard output
//!
//! Uses enum dispatch instead of trait objects.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Default print handler that writes to stdout.
#[derive(Default)]
pub struct StdoutPrintHandler;

impl StdoutPrintHandler {
    /// Write `msg` and flush, so partial lines appear immediately.
    pub fn print(&self, msg: &str) {
        let mut out = std::io::stdout().lock();
        // A closed stdout is not a script failure.
        let _ = out.write_all(msg.as_bytes());
        let _ = out.flush();
    }
}

/// Print handler that captures output to a buffer.
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    /// Create a new buffer print handler.
    pub fn new() -> Self {
        BufferPrintHandler {
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    /// Get all captured output.
    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Clear captured output.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferPrintHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Print handler implementation using enum dispatch.
pub enum PrintHandlerImpl {
    /// Writes to stdout (default).
    Stdout(StdoutPrintHandler),
    /// Captures to buffer.
    Buffer(BufferPrintHandler),
    /// Discards all output.
    Silent,
}

impl PrintHandlerImpl {
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout(h) => h.print(msg),
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Get all captured output.
    ///
    /// Returns empty string for handlers that don't capture (stdout, silent).
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout(_) | Self::Silent => String::new(),
        }
    }

    /// Clear captured output.
    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared print handler that can be passed around.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

/// Create a default stdout print handler.
pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout(StdoutPrintHandler))
}

/// Create a buffer print handler for capturing output.
pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

/// Create a silent print handler that discards all output.
pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_captures_in_order() {
        let handler = buffer_handler();
        handler.print("0x2a");
        handler.print(" ");
        handler.print("42\n");
        assert_eq!(handler.get_output(), "0x2a 42\n");
    }

    #[test]
    fn buffer_clear() {
        let handler = buffer_handler();
        handler.print("hello");
        handler.clear();
        assert_eq!(handler.get_output(), "");
    }

    #[test]
    fn silent_discards() {
        let handler = silent_handler();
        handler.print("hello");
        assert_eq!(handler.get_output(), "");
    }
}
