//! Source locations attached to every node for diagnostics.

use std::fmt;
use std::sync::Arc;

/// Position of a construct in a script file.
///
/// Lines and columns are 1-based. The file name is shared between all
/// locations of one unit, so cloning a location never copies the path.
#[derive(Clone, Eq, PartialEq, Hash, Default)]
pub struct Location {
    file: Arc<str>,
    line: u32,
    column: u32,
}

impl Location {
    /// Create a location inside `file`.
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32) -> Self {
        Location {
            file: file.into(),
            line,
            column,
        }
    }

    /// Location for constructs that do not come from a file (interactive
    /// input, generated nodes).
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Path of the unit this location belongs to (empty if unknown).
    #[inline]
    pub fn file(&self) -> &str {
        &self.file
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Same file, different position.
    #[must_use]
    pub fn at(&self, line: u32, column: u32) -> Self {
        Location {
            file: Arc::clone(&self.file),
            line,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self})")
    }
}
