//! Transient-fault retry policy.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use tracing::warn;

use drivepath_core::config::RetryConfig;
use drivepath_core::result::AppResult;
use drivepath_core::traits::{ByteStream, RemoteDrive};
use drivepath_core::types::{FilePage, RemoteResource, ResourceMetadata, TransferCallbacks};

/// Wraps a drive and retries calls that fail with a `Transient` error.
///
/// After the first attempt up to `max_attempts` retries follow, each after
/// `base_delay * 2^n` plus a random jitter of at most `max_jitter`. Any other
/// error kind is returned immediately.
#[derive(Debug)]
pub struct RetryingDrive<D> {
    inner: D,
    config: RetryConfig,
}

impl<D: RemoteDrive> RetryingDrive<D> {
    /// Wrap `inner` with the given policy.
    pub fn new(inner: D, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// The wrapped drive.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    fn delay(&self, attempt: u32) -> Duration {
        let jitter = if self.config.max_jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=self.config.max_jitter_ms)
        };
        self.config.backoff(attempt) + Duration::from_millis(jitter)
    }

    async fn retry<T, F, Fut>(&self, operation: &'static str, mut call: F) -> AppResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = AppResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 0u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.config.max_attempts => {
                    let delay = self.delay(attempt);
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient remote failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl<D: RemoteDrive> RemoteDrive for RetryingDrive<D> {
    async fn get(&self, id: &str) -> AppResult<RemoteResource> {
        self.retry("get", || self.inner.get(id)).await
    }

    async fn list(&self, query: &str, page_token: Option<&str>) -> AppResult<FilePage> {
        self.retry("list", || self.inner.list(query, page_token))
            .await
    }

    async fn create(&self, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        self.retry("create", || self.inner.create(metadata)).await
    }

    async fn create_with_content(
        &self,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let content = &content;
        self.retry("create_with_content", || {
            self.inner
                .create_with_content(metadata, content.clone(), content_type, callbacks)
        })
        .await
    }

    async fn update(&self, id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        self.retry("update", || self.inner.update(id, metadata)).await
    }

    async fn update_with_content(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let content = &content;
        self.retry("update_with_content", || {
            self.inner
                .update_with_content(id, metadata, content.clone(), content_type, callbacks)
        })
        .await
    }

    async fn copy(&self, source_id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        self.retry("copy", || self.inner.copy(source_id, metadata))
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.retry("delete", || self.inner.delete(id)).await
    }

    async fn download(&self, id: &str) -> AppResult<ByteStream> {
        self.retry("download", || self.inner.download(id)).await
    }

    async fn export(&self, id: &str, mime_type: &str) -> AppResult<ByteStream> {
        self.retry("export", || self.inner.export(id, mime_type))
            .await
    }
}

#[cfg(test)]
mod tests {
    use drivepath_core::ErrorKind;
    use drivepath_core::error::AppError;

    use super::*;
    use crate::memory::{MemoryDrive, Operation};

    fn policy() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 200,
            max_jitter_ms: 0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let drive = MemoryDrive::new();
        let file = drive.seed_file("a.txt", None, "a");
        drive.fail_next(Operation::Get, AppError::transient("503"));
        drive.fail_next(Operation::Get, AppError::transient("429"));
        let retrying = RetryingDrive::new(drive, policy());

        let started = tokio::time::Instant::now();
        let got = retrying.get(&file.id).await.unwrap();
        assert_eq!(got.id, file.id);
        assert_eq!(retrying.inner().counts().get, 3);
        assert!(started.elapsed() >= Duration::from_millis(200 + 400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failures_are_not_retried() {
        let drive = MemoryDrive::new();
        let retrying = RetryingDrive::new(drive, policy());
        let err = retrying.get("missing").await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
        assert_eq!(retrying.inner().counts().get, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let drive = MemoryDrive::new();
        for _ in 0..10 {
            drive.fail_next(Operation::List, AppError::transient("502"));
        }
        let retrying = RetryingDrive::new(drive, policy());
        let err = retrying.list(" trashed = false ", None).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(retrying.inner().counts().list, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_stays_within_bound() {
        let retrying = RetryingDrive::new(
            MemoryDrive::new(),
            RetryConfig {
                max_attempts: 1,
                base_delay_ms: 100,
                max_jitter_ms: 50,
            },
        );
        for _ in 0..20 {
            let d = retrying.delay(1);
            assert!(d >= Duration::from_millis(200) && d <= Duration::from_millis(250));
        }
    }
}
