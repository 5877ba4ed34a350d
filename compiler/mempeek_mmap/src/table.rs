//! Registry of mapped windows.

use std::sync::Arc;

use mempeek_ir::{AccessSize, Word};
use tracing::debug;

use crate::{MapError, MappingDriver, RegisterWindow};

/// Device used by `map` directives that do not name one.
pub const DEFAULT_DEVICE: &str = "/dev/mem";

/// All windows registered so far, searched in registration order.
pub struct MappingTable {
    driver: Box<dyn MappingDriver>,
    windows: Vec<Arc<dyn RegisterWindow>>,
}

impl MappingTable {
    pub fn new(driver: Box<dyn MappingDriver>) -> Self {
        MappingTable {
            driver,
            windows: Vec::new(),
        }
    }

    /// Register `[phys, phys + len)` of `device`.
    ///
    /// A range already covered by a window of the same device is accepted
    /// without asking the driver again.
    pub fn map_memory(&mut self, phys: Word, len: Word, device: &str) -> Result<(), MapError> {
        if len == 0 {
            return Err(MapError::EmptyRange { phys });
        }
        let end = phys
            .checked_add(len)
            .ok_or(MapError::Overflow { phys, len })?;

        let covered = self.windows.iter().any(|w| {
            w.device() == device && w.base() <= phys && end <= w.base().saturating_add(w.len())
        });
        if covered {
            debug!(phys, len, device, "range already mapped");
            return Ok(());
        }

        let window = self.driver.map(phys, len, device)?;
        debug!(phys, len, device, "mapped");
        self.windows.push(Arc::from(window));
        Ok(())
    }

    /// Find the window covering a `size` access at `address`.
    pub fn find(&self, address: Word, size: AccessSize) -> Option<Arc<dyn RegisterWindow>> {
        self.windows
            .iter()
            .find(|w| w.contains(address, size))
            .cloned()
    }

    /// Number of registered windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
