use mempeek_ir::Word;

/// Failure to register a mapping.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("cannot map an empty range at {phys:#x}")]
    EmptyRange { phys: Word },

    #[error("range {phys:#x}+{len:#x} wraps the address space")]
    Overflow { phys: Word, len: Word },

    #[error("cannot map {device}: {reason}")]
    Device { device: String, reason: String },
}
