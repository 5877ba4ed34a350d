//! `EnvironmentBuilder` for creating environments with various configurations.

use std::cell::RefCell;
use std::rc::Rc;

use mempeek_ir::AccessSize;
use mempeek_mmap::{MappingDriver, MappingTable, SimulatedDriver};
use rustc_hash::FxHashMap;

use super::storage::VarStorage;
use super::Environment;
use crate::{stdout_handler, SharedPrintHandler, StopFlag};

/// Builder for [`Environment`].
///
/// Defaults:
/// - word size: the host pointer width
/// - output: stdout
/// - a fresh stop flag
/// - the simulated mapping driver
pub struct EnvironmentBuilder {
    default_size: AccessSize,
    print_handler: Option<SharedPrintHandler>,
    stop: Option<StopFlag>,
    driver: Option<Box<dyn MappingDriver>>,
}

impl EnvironmentBuilder {
    pub fn new() -> Self {
        EnvironmentBuilder {
            default_size: AccessSize::native(),
            print_handler: None,
            stop: None,
            driver: None,
        }
    }

    /// Word size for `print` formats without an explicit size.
    ///
    /// Print nodes read it once, when they are built.
    #[must_use]
    pub fn default_size(mut self, size: AccessSize) -> Self {
        self.default_size = size;
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Share a stop flag with a supervisor.
    #[must_use]
    pub fn stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Driver used by `map` directives.
    #[must_use]
    pub fn driver(mut self, driver: impl MappingDriver + 'static) -> Self {
        self.driver = Some(Box::new(driver));
        self
    }

    pub fn build(self) -> Environment {
        let driver = self
            .driver
            .unwrap_or_else(|| Box::new(SimulatedDriver::new()));
        Environment {
            globals: RefCell::new(FxHashMap::default()),
            global_storage: Rc::new(VarStorage::global()),
            members: RefCell::new(FxHashMap::default()),
            subroutines: RefCell::new(FxHashMap::default()),
            pending: RefCell::new(None),
            mappings: RefCell::new(MappingTable::new(driver)),
            default_size: self.default_size,
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
            stop: self.stop.unwrap_or_default(),
        }
    }
}

impl Default for EnvironmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
