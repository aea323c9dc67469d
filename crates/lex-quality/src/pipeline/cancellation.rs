//! Cancellation and time-budget support for an analysis run.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_quality::{Analyzer, CancellationToken};
//!
//! let token = CancellationToken::new();
//! let token_clone = token.clone();
//!
//! // In another thread
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_secs(5));
//!     token_clone.cancel();
//! });
//!
//! let report = Analyzer::builder()
//!     .cancellation_token(token)
//!     .build()?
//!     .analyze(&dataset);
//! ```

use crate::error::{QualityError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Token for cancelling a running analysis.
///
/// Cloning shares the flag, so any clone can cancel from any thread. The
/// engine checks it between stages and between columns and returns
/// [`QualityError::Cancelled`].
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(CancellationToken: Send, Sync);

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Thread-safe.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` if [`cancel()`](Self::cancel) has been called on this
    /// token or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }
}

/// Per-run guard combining the cancellation token and the time budget.
///
/// Shared by reference with the profiler and every detector.
#[derive(Debug, Clone)]
pub struct RunGuard {
    token: CancellationToken,
    started: Instant,
    budget: Option<Duration>,
}

impl RunGuard {
    pub fn new(token: CancellationToken, budget_ms: Option<u64>) -> Self {
        Self {
            token,
            started: Instant::now(),
            budget: budget_ms.map(Duration::from_millis),
        }
    }

    /// A guard that never trips.
    pub fn unbounded() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fail if the run was cancelled or ran past its budget.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(QualityError::Cancelled);
        }
        if let Some(budget) = self.budget {
            let elapsed = self.started.elapsed();
            if elapsed > budget {
                return Err(QualityError::resource_exceeded(
                    "time_budget_ms",
                    budget.as_millis() as u64,
                    elapsed.as_millis() as u64,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());

        clone.cancel();
        assert!(token.is_cancelled());

        token.reset();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn test_guard_reports_cancellation() {
        let token = CancellationToken::new();
        let guard = RunGuard::new(token.clone(), None);
        assert!(guard.check().is_ok());

        token.cancel();
        assert!(matches!(guard.check(), Err(QualityError::Cancelled)));
    }

    #[test]
    fn test_guard_reports_exhausted_budget() {
        let guard = RunGuard::new(CancellationToken::new(), Some(0));
        std::thread::sleep(Duration::from_millis(5));

        let err = guard.check().unwrap_err();
        assert!(err.is_resource_exceeded());
    }

    #[test]
    fn test_unbounded_guard() {
        assert!(RunGuard::unbounded().check().is_ok());
    }
}
