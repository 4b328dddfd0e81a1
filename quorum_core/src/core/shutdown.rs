//! Cooperative shutdown signal shared by every behavior and arbiter
//! thread.
//!
//! There is no preemptive cancellation: each loop polls the flag once
//! per iteration and exits at the top of its next cycle. A thread stuck
//! inside its own `action()` will therefore not be stopped; behaviors
//! are expected to keep their iterations short.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle on the global shutdown flag.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Every polling loop exits at its next check.
    pub fn signal(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn in_progress(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Wire this flag to ctrl-c. May only be installed once per
    /// process; a second installation reports the underlying error.
    pub fn install_ctrlc_handler(&self) -> crate::error::QuorumResult<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.signal())
            .map_err(|e| crate::error::QuorumError::Internal(format!("ctrl-c handler: {}", e)))
    }
}
