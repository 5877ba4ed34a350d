//! Register-access port.
//!
//! Scripts never touch memory directly. Every peek and poke goes through a
//! [`RegisterWindow`] found in the [`MappingTable`]:
//!
//! - `map` directives register windows through a [`MappingDriver`]
//! - peek/poke look up the window covering `[address, address + size)`
//! - after each access the window reports whether the access faulted
//!
//! The only driver shipped here is [`SimulatedDriver`], a sparse in-memory
//! model of a physical address space with fault injection. A driver backed
//! by a real device file plugs in through the same trait.

mod error;
mod simulated;
mod table;
mod window;

pub use error::MapError;
pub use simulated::{SimulatedDriver, SimulatedMemory, SimulatedWindow};
pub use table::{MappingTable, DEFAULT_DEVICE};
pub use window::{MappingDriver, RegisterWindow};
