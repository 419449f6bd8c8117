//! Re-entrancy guard for mutating entry points.
//!
//! A [`ReentrancyLock`] is a shared in-progress flag. Entering returns an
//! [`EntryGuard`] that clears the flag when dropped; entering while the flag
//! is set fails with [`Error::Reentrancy`]. Handles are cheap clones of the
//! same flag, so a collaborator holding one observes the engine's state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Shared non-reentrancy flag
#[derive(Debug, Clone, Default)]
pub struct ReentrancyLock {
    entered: Arc<AtomicBool>,
}

impl ReentrancyLock {
    /// Create an unlocked flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag for the lifetime of the returned guard
    pub fn enter(&self) -> Result<EntryGuard> {
        self.entered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::Reentrancy)?;
        Ok(EntryGuard {
            entered: Arc::clone(&self.entered),
        })
    }

    /// Whether a guarded call is in progress
    pub fn is_entered(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// Scoped holder of the flag; releases it on drop
#[derive(Debug)]
pub struct EntryGuard {
    entered: Arc<AtomicBool>,
}

impl Drop for EntryGuard {
    fn drop(&mut self) {
        self.entered.store(false, Ordering::Release);
    }
}
