//! Cooperative cancellation shared between a loading run and its fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Revocable signal for one loading run
///
/// Clones share the same flag. The flag flips to cancelled at most once and
/// stays there; reads are a single atomic load so loops and fetches can poll
/// it as often as they like. Every run gets a fresh scope, so cancelling a
/// superseded run never touches its replacement.
#[derive(Debug, Clone, Default)]
pub struct CancellationScope {
    cancelled: Arc<AtomicBool>,
}

impl CancellationScope {
    /// Create a scope that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    ///
    /// Returns `true` if this call performed the transition and `false` if the
    /// scope was already cancelled.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::SeqCst)
    }

    /// Check whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Whether `other` shares this scope's flag
    pub fn same_scope(&self, other: &CancellationScope) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}
