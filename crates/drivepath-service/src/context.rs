//! Per-call cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;

/// Context passed into every remote-bound service method.
///
/// Cancelling the token, or passing the deadline, makes the in-flight remote
/// call and every later one fail with `Cancelled`. Cache writes happen only
/// after a remote call completes, so a cancelled call leaves the cache as it
/// was.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().with_deadline(Instant::now() + timeout)
    }

    /// Replace the deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// A context driven by an existing token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// A context cancelled together with this one, sharing its deadline.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            deadline: self.deadline,
        }
    }

    /// The cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and its children.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the context was cancelled or its deadline passed.
    pub fn is_done(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Fail with `Cancelled` if the context is done.
    pub fn check(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::cancelled("Operation cancelled"));
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(AppError::cancelled("Deadline elapsed"));
        }
        Ok(())
    }

    /// Run `fut` unless the context is cancelled or expires first.
    pub async fn run<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;
        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(AppError::cancelled("Operation cancelled")),
                _ = tokio::time::sleep_until(deadline) => Err(AppError::cancelled("Deadline elapsed")),
                result = fut => result,
            },
            None => tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(AppError::cancelled("Operation cancelled")),
                result = fut => result,
            },
        }
    }
}
