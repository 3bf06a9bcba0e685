//! Cooperative cancellation for render passes.
//!
//! A [`CancelToken`] is checked at stage boundaries (and before each data
//! source read). It never interrupts a stage midway.

use crate::error::{PomlError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Shared cancel flag plus an optional deadline.
///
/// Clones share the flag, so a caller can keep one clone and cancel a pass
/// running on another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Request cancellation. Takes effect at the next check.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if the token was cancelled or its deadline has passed.
    pub fn check(&self, stage: &'static str) -> Result<()> {
        if self.is_cancelled() {
            return Err(PomlError::Cancelled { stage });
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(PomlError::DeadlineExceeded { stage });
        }
        Ok(())
    }
}
