use crate::error::StoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline and cancellation carried into every store round trip.
///
/// Clones share the cancellation flag, so a context handed to a worker can be
/// cancelled from the caller. Gateways call [`OpContext::check`] before
/// touching data.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl OpContext {
    /// A context with no deadline that is never cancelled unless asked to.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context expiring at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            cancelled: Arc::default(),
        }
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true once [`OpContext::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_context_is_live() {
        assert!(OpContext::background().check().is_ok());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let ctx = OpContext::with_timeout(Duration::from_secs(60));
        let handle = ctx.clone();
        handle.cancel();
        assert!(matches!(ctx.check(), Err(StoreError::Cancelled)));
    }

    #[test]
    fn expired_deadline_fails() {
        let ctx = OpContext::with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(StoreError::DeadlineExceeded)));
    }
}
