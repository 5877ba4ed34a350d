//! Print format descriptors.

use crate::AccessSize;

/// How a word is rendered by `print`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum FormatKind {
    /// Unsigned decimal.
    #[default]
    Dec,
    /// Signed decimal (value sign-extended from the format size).
    Signed,
    /// `0x` followed by exactly two hex digits per byte.
    Hex,
    /// Bits in groups of four, most significant first.
    Bin,
    /// The word's bit pattern read as an IEEE-754 double.
    Float,
}

/// A format kind paired with an optional size.
///
/// `size: None` means "the configured default word size"; the evaluator
/// resolves it once when the print node is built.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct PrintFormat {
    pub kind: FormatKind,
    pub size: Option<AccessSize>,
}

impl PrintFormat {
    pub const fn new(kind: FormatKind, size: AccessSize) -> Self {
        PrintFormat {
            kind,
            size: Some(size),
        }
    }

    /// Format that uses the default word size.
    pub const fn word_sized(kind: FormatKind) -> Self {
        PrintFormat { kind, size: None }
    }

    /// Replace an unresolved size with `default`.
    #[must_use]
    pub const fn resolve(self, default: AccessSize) -> Self {
        match self.size {
            Some(_) => self,
            None => PrintFormat {
                kind: self.kind,
                size: Some(default),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_fills_missing_size() {
        let fmt = PrintFormat::word_sized(FormatKind::Hex).resolve(AccessSize::Bits16);
        assert_eq!(fmt, PrintFormat::new(FormatKind::Hex, AccessSize::Bits16));
    }

    #[test]
    fn resolve_keeps_explicit_size() {
        let fmt = PrintFormat::new(FormatKind::Bin, AccessSize::Bits8).resolve(AccessSize::Bits64);
        assert_eq!(fmt.size, Some(AccessSize::Bits8));
    }
}
