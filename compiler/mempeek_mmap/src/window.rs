//! Traits at the driver boundary.

use mempeek_ir::{AccessSize, Word};

use crate::MapError;

/// One mapped physical address range.
///
/// Addresses passed to the access methods are physical addresses inside
/// the window. Every access updates the fault state queried by
/// [`has_failed`](RegisterWindow::has_failed).
pub trait RegisterWindow: Send + Sync {
    /// First physical address of the window.
    fn base(&self) -> Word;

    /// Length in bytes.
    fn len(&self) -> Word;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Device the window was mapped from.
    fn device(&self) -> &str;

    /// Whether `[address, address + size)` lies fully inside the window.
    fn contains(&self, address: Word, size: AccessSize) -> bool {
        let Some(offset) = address.checked_sub(self.base()) else {
            return false;
        };
        offset
            .checked_add(size.bytes())
            .is_some_and(|end| end <= self.len())
    }

    /// Read `size` bytes, zero-extended.
    fn read(&self, address: Word, size: AccessSize) -> Word;

    /// Write the low `size` bytes of `value`.
    fn write(&self, address: Word, size: AccessSize, value: Word);

    /// Clear the bits of `mask` in the register.
    fn clear_bits(&self, address: Word, size: AccessSize, mask: Word);

    /// Set the bits of `mask` in the register.
    fn set_bits(&self, address: Word, size: AccessSize, mask: Word);

    /// Whether the most recent access faulted.
    fn has_failed(&self) -> bool;
}

/// Creates windows for `map` directives.
pub trait MappingDriver {
    fn map(&mut self, phys: Word, len: Word, device: &str)
        -> Result<Box<dyn RegisterWindow>, MapError>;
}
