//! Cancellation for in-flight fetch cycles.
//!
//! A controller hands a [`CancelToken`] to each fetch it starts. Starting a
//! newer fetch, or disposing the controller, cancels the older token; a
//! result that arrives for a cancelled token is dropped instead of committed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancel flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
