//! Cooperative cancellation.
//! A one-way stop flag checked at chunk boundaries inside the transfer loop;
//! there is no preemption, so cancellation granularity is bounded by the
//! transfer chunk size.
//!
//! Relaxed atomics are sufficient for a one-way flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag. Cloning yields a handle to the same flag, so one
/// side can hold the token while another thread (or a progress listener)
/// requests cancellation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation (idempotent, callable from any thread).
    #[inline]
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
