//! Process-wide stop request.
//!
//! A supervisor (signal handler thread, UI, test) holds a clone of the
//! [`StopFlag`] and calls [`request_stop`](StopFlag::request_stop). The
//! evaluator observes it between block statements and while sleeping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
struct StopState {
    requested: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Shared, thread-safe stop request.
#[derive(Clone, Default)]
pub struct StopFlag {
    state: Arc<StopState>,
}

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running script to terminate and wake any pending sleep.
    pub fn request_stop(&self) {
        self.state.requested.store(true, Ordering::SeqCst);
        let _guard = self.state.lock.lock();
        self.state.wake.notify_all();
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.state.requested.load(Ordering::SeqCst)
    }

    /// Withdraw a stop request so the environment can run again.
    pub fn reset(&self) {
        self.state.requested.store(false, Ordering::SeqCst);
    }

    /// Block for `duration` unless a stop is requested first.
    ///
    /// Returns `false` when the sleep was cut short by a stop request.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now().checked_add(duration);
        let mut guard = self.state.lock.lock();
        loop {
            if self.is_requested() {
                return false;
            }
            match deadline {
                Some(deadline) => {
                    if self.state.wake.wait_until(&mut guard, deadline).timed_out() {
                        return !self.is_requested();
                    }
                }
                None => self.state.wake.wait(&mut guard),
            }
        }
    }
}

impl std::fmt::Debug for StopFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StopFlag").field(&self.is_requested()).finish()
    }
}
