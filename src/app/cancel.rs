// src/app/cancel.rs
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TOKEN_ID: AtomicU64 = AtomicU64::new(1);

/// Cooperative cancellation flag for one in-flight request.
///
/// Clones share the flag. The worker keeps one clone, the controller the other;
/// a reply whose token was canceled is dropped before it touches any state.
#[derive(Clone, Debug)]
pub struct CancelToken {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            id: NEXT_TOKEN_ID.fetch_add(1, Ordering::Relaxed),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub const fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Same request (not merely same state)?
    pub fn same_request(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
