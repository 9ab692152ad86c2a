//! Forced redirect to the login destination.
//!
//! When the API layer sees an authorization failure it may be deep inside
//! a request task, with no say over what the app is currently showing.
//! `LogoutSignal` is the sanctioned escape hatch: raising it marks a
//! redirect that the app loop applies directly, bypassing guard
//! evaluation, so it lands even if navigation state is mid-transition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

/// Clonable flag shared between the request layer and the app loop.
/// Raising is idempotent: any number of concurrent authorization failures
/// collapse into a single redirect.
#[derive(Clone, Default)]
pub struct LogoutSignal {
    pending: Arc<AtomicBool>,
}

impl LogoutSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a forced redirect to login. No-op if one is already pending.
    pub fn raise(&self) {
        if !self.pending.swap(true, Ordering::SeqCst) {
            warn!("Authorization failure, forcing redirect to login");
        }
    }

    /// Consume a pending redirect. Returns true exactly once per raise
    /// (however many times it was raised).
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::SeqCst)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_then_take() {
        let signal = LogoutSignal::new();
        assert!(!signal.is_pending());

        signal.raise();
        assert!(signal.is_pending());

        assert!(signal.take());
        assert!(!signal.is_pending());
        assert!(!signal.take());
    }

    #[test]
    fn test_concurrent_raises_collapse() {
        let signal = LogoutSignal::new();

        // Several requests failing authorization at once
        for _ in 0..5 {
            signal.clone().raise();
        }

        assert!(signal.take());
        // One redirect total, not five
        assert!(!signal.take());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let signal = LogoutSignal::new();
        let from_request_task = signal.clone();

        from_request_task.raise();
        assert!(signal.is_pending());
        assert!(signal.take());
        assert!(!from_request_task.is_pending());
    }
}
