//! Single-flight cycle gate
//!
//! Tab-context events can arrive faster than a cycle completes. The gate
//! guarantees at most one live evaluation cycle: opening a new cycle makes
//! every earlier token stale, so a preempted cycle stops issuing dispatch
//! work (last-event-wins). Calls already issued against the host are not
//! rolled back by preemption.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared monotonic generation counter for one engine
#[derive(Debug, Clone, Default)]
pub struct CycleGate {
    current: Arc<AtomicU64>,
}

impl CycleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the next cycle, invalidating all previously issued tokens
    pub fn open(&self) -> CycleToken {
        let epoch = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        CycleToken {
            epoch,
            current: Arc::clone(&self.current),
        }
    }
}

/// Token held by one evaluation cycle
#[derive(Debug, Clone)]
pub struct CycleToken {
    epoch: u64,
    current: Arc<AtomicU64>,
}

impl CycleToken {
    /// False once a newer cycle has been opened
    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.epoch
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
