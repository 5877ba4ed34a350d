//! In-memory stand-in for a device-backed driver.
//!
//! All windows created by one [`SimulatedDriver`] view the same sparse
//! physical memory. Bytes never written read as zero. Addresses marked with
//! [`SimulatedMemory::inject_fault`] make every access touching them fault
//! (the access still happens, only the fault state is raised).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mempeek_ir::{AccessSize, Word};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{MapError, MappingDriver, RegisterWindow};

#[derive(Default)]
struct MemoryState {
    bytes: FxHashMap<Word, u8>,
    faults: FxHashSet<Word>,
}

/// Shared handle to a simulated physical address space.
#[derive(Clone, Default)]
pub struct SimulatedMemory {
    state: Arc<Mutex<MemoryState>>,
}

impl SimulatedMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Little-endian read of `size` bytes at `address`.
    pub fn read(&self, address: Word, size: AccessSize) -> Word {
        let state = self.state.lock();
        (0..size.bytes()).fold(0, |acc, i| {
            let byte = state
                .bytes
                .get(&address.wrapping_add(i))
                .copied()
                .unwrap_or(0);
            acc | (Word::from(byte) << (8 * i))
        })
    }

    /// Little-endian write of the low `size` bytes of `value`.
    pub fn write(&self, address: Word, size: AccessSize, value: Word) {
        let mut state = self.state.lock();
        for i in 0..size.bytes() {
            let byte = (value >> (8 * i)) as u8;
            state.bytes.insert(address.wrapping_add(i), byte);
        }
    }

    /// Make every access touching `address` fault.
    pub fn inject_fault(&self, address: Word) {
        self.state.lock().faults.insert(address);
    }

    pub fn clear_faults(&self) {
        self.state.lock().faults.clear();
    }

    fn faults_in(&self, address: Word, size: AccessSize) -> bool {
        let state = self.state.lock();
        (0..size.bytes()).any(|i| state.faults.contains(&address.wrapping_add(i)))
    }
}

/// A window onto [`SimulatedMemory`].
pub struct SimulatedWindow {
    base: Word,
    len: Word,
    device: String,
    memory: SimulatedMemory,
    failed: AtomicBool,
}

impl SimulatedWindow {
    fn record(&self, address: Word, size: AccessSize) {
        let failed = self.memory.faults_in(address, size);
        self.failed.store(failed, Ordering::Relaxed);
    }
}

impl RegisterWindow for SimulatedWindow {
    fn base(&self) -> Word {
        self.base
    }

    fn len(&self) -> Word {
        self.len
    }

    fn device(&self) -> &str {
        &self.device
    }

    fn read(&self, address: Word, size: AccessSize) -> Word {
        self.record(address, size);
        self.memory.read(address, size)
    }

    fn write(&self, address: Word, size: AccessSize, value: Word) {
        self.record(address, size);
        self.memory.write(address, size, value);
    }

    fn clear_bits(&self, address: Word, size: AccessSize, mask: Word) {
        self.record(address, size);
        let current = self.memory.read(address, size);
        self.memory.write(address, size, current & !mask);
    }

    fn set_bits(&self, address: Word, size: AccessSize, mask: Word) {
        self.record(address, size);
        let current = self.memory.read(address, size);
        self.memory.write(address, size, current | mask);
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Driver producing [`SimulatedWindow`]s over one shared memory.
#[derive(Default)]
pub struct SimulatedDriver {
    memory: SimulatedMemory,
    refused: FxHashSet<String>,
}

impl SimulatedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver over an existing memory handle, so a test can inspect it.
    pub fn with_memory(memory: SimulatedMemory) -> Self {
        SimulatedDriver {
            memory,
            refused: FxHashSet::default(),
        }
    }

    /// Make every mapping request for `device` fail.
    #[must_use]
    pub fn refuse(mut self, device: impl Into<String>) -> Self {
        self.refused.insert(device.into());
        self
    }

    pub fn memory(&self) -> &SimulatedMemory {
        &self.memory
    }
}

impl MappingDriver for SimulatedDriver {
    fn map(
        &mut self,
        phys: Word,
        len: Word,
        device: &str,
    ) -> Result<Box<dyn RegisterWindow>, MapError> {
        if self.refused.contains(device) {
            return Err(MapError::Device {
                device: device.to_string(),
                reason: "permission denied".to_string(),
            });
        }
        Ok(Box::new(SimulatedWindow {
            base: phys,
            len,
            device: device.to_string(),
            memory: self.memory.clone(),
            failed: AtomicBool::new(false),
        }))
    }
}
