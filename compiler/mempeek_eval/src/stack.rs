//! Stack growth for node execution.
//!
//! A script call level nests several `execute` frames (call, block, branch,
//! assignment, operator), and scripts recurse through subroutines without a
//! depth limit. [`ensure_sufficient_stack`] wraps every node execution and
//! moves onto a fresh stack segment when the current one runs low, so the
//! depth a script can reach is bounded by memory rather than the thread's
//! stack size.

/// Headroom one `execute` frame may use before the next check.
///
/// Generous for a single node: peek/poke and print keep their buffers on the
/// heap.
#[cfg(not(target_arch = "wasm32"))]
const EXECUTE_HEADROOM: usize = 100 * 1024;

/// Size of each additional stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `execute` with at least [`EXECUTE_HEADROOM`] bytes of stack left.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(execute: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(EXECUTE_HEADROOM, SEGMENT_SIZE, execute)
}

/// WASM manages its own stack; run `execute` in place.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(execute: impl FnOnce() -> R) -> R {
    execute()
}
