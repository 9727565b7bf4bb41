//! Progress and failure callbacks for uploads, downloads and exports.

use std::fmt;
use std::sync::Arc;

use crate::error::AppError;

type ProgressFn = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;
type FailureFn = Arc<dyn Fn(&AppError) + Send + Sync>;

/// Optional callbacks invoked while bytes move to or from the remote drive.
///
/// `on_progress` receives `(bytes_transferred, total_bytes)`; the total is
/// `None` when the remote side does not report a length.
#[derive(Clone, Default)]
pub struct TransferCallbacks {
    on_progress: Option<ProgressFn>,
    on_failure: Option<FailureFn>,
}

impl TransferCallbacks {
    /// Callbacks that do nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the progress callback.
    pub fn on_progress(mut self, f: impl Fn(u64, Option<u64>) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    /// Set the failure callback.
    pub fn on_failure(mut self, f: impl Fn(&AppError) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(f));
        self
    }

    /// Report progress.
    pub fn progress(&self, transferred: u64, total: Option<u64>) {
        if let Some(f) = &self.on_progress {
            f(transferred, total);
        }
    }

    /// Report a failure.
    pub fn failure(&self, err: &AppError) {
        if let Some(f) = &self.on_failure {
            f(err);
        }
    }
}

impl fmt::Debug for TransferCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferCallbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}
