//! Cancellation token
//!
//! Shared with the Ctrl+C handler thread, so the flag is atomic even though
//! the compiler itself is single-threaded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancellation_requested(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Whether an optional token has been cancelled.
pub fn is_cancelled(token: Option<&CancellationToken>) -> bool {
    token.is_some_and(CancellationToken::is_cancellation_requested)
}
