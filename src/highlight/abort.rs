// WHY: Cancellation is cooperative, the engine polls between classifier calls
// A deadline and an explicit abort share one check so callers get the same partial result either way

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Cooperative cancellation checked by the engine between sentences
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl AbortSignal {
    /// Signal that only fires when [`AbortSignal::abort`] is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that also fires once `deadline` has passed
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}
