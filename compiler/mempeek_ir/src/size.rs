//! The word type and access sizes.

use std::fmt;

/// The only value type of the language: a 64-bit unsigned integer.
///
/// Signed and floating-point views are reinterpretations applied at
/// operator or formatting boundaries.
pub type Word = u64;

/// Result of a comparison or logical operator that holds.
pub const TRUE: Word = Word::MAX;

/// Result of a comparison or logical operator that does not hold.
pub const FALSE: Word = 0;

/// Width of a register access or print conversion.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum AccessSize {
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl AccessSize {
    /// All sizes, narrowest first.
    pub const ALL: [AccessSize; 4] = [
        AccessSize::Bits8,
        AccessSize::Bits16,
        AccessSize::Bits32,
        AccessSize::Bits64,
    ];

    /// Size matching the pointer width of the host.
    pub const fn native() -> Self {
        if usize::BITS == 64 {
            AccessSize::Bits64
        } else {
            AccessSize::Bits32
        }
    }

    /// Look up a size by its width in bits.
    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            8 => Some(AccessSize::Bits8),
            16 => Some(AccessSize::Bits16),
            32 => Some(AccessSize::Bits32),
            64 => Some(AccessSize::Bits64),
            _ => None,
        }
    }

    /// Width in bytes.
    #[inline]
    pub const fn bytes(self) -> u64 {
        match self {
            AccessSize::Bits8 => 1,
            AccessSize::Bits16 => 2,
            AccessSize::Bits32 => 4,
            AccessSize::Bits64 => 8,
        }
    }

    /// Width in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            AccessSize::Bits8 => 8,
            AccessSize::Bits16 => 16,
            AccessSize::Bits32 => 32,
            AccessSize::Bits64 => 64,
        }
    }

    /// Mask covering every bit of this size.
    #[inline]
    pub const fn mask(self) -> Word {
        match self {
            AccessSize::Bits8 => 0xff,
            AccessSize::Bits16 => 0xffff,
            AccessSize::Bits32 => 0xffff_ffff,
            AccessSize::Bits64 => Word::MAX,
        }
    }

    /// Drop the bits above this size.
    #[inline]
    pub const fn truncate(self, value: Word) -> Word {
        value & self.mask()
    }

    /// Interpret the low bits of `value` as a two's complement number of
    /// this size.
    #[inline]
    pub const fn sign_extend(self, value: Word) -> i64 {
        let shift = 64 - self.bits();
        ((value << shift).cast_signed()) >> shift
    }
}

impl fmt::Display for AccessSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}
