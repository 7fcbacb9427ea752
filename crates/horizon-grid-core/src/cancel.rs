//! Cooperative cancellation for background work.
//!
//! A [`CancellationToken`] is shared between the owner of a task and the task
//! itself. The owner calls [`cancel`](CancellationToken::cancel); the task
//! polls [`is_cancelled`](CancellationToken::is_cancelled) (or uses
//! [`check`](CancellationToken::check) with `?`) at convenient points and
//! stops without publishing partial results.
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let task_token = token.clone();
//!
//! token.cancel();
//! assert!(task_token.is_cancelled());
//! assert!(task_token.check().is_err());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{CoreError, Result};

/// A cancellation token for cooperative task cancellation.
///
/// Cloning a token yields a handle to the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    ///
    /// Returns `true` if this call transitioned the token to the cancelled state.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Return `Err(CoreError::Cancelled)` once cancellation has been requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        assert!(token.cancel());
        assert!(clone.is_cancelled());
        assert!(!token.cancel());
    }

    #[test]
    fn test_check() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
        token.cancel();
        assert_eq!(token.check(), Err(CoreError::Cancelled));
    }
}
