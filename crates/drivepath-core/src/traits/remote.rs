//! Remote-drive collaborator trait.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;
use crate::types::{FilePage, RemoteResource, ResourceMetadata, TransferCallbacks};

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Operations exposed by a remote hierarchical file store.
///
/// Implementations classify failures: `NotFound` for unknown ids,
/// `NotAuthenticated` when credentials are missing, `Transient` for faults a
/// retry may cure and `Remote` for everything else. The HTTP client and the
/// in-memory drive live in `drivepath-remote`.
#[async_trait]
pub trait RemoteDrive: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a resource by id.
    async fn get(&self, id: &str) -> AppResult<RemoteResource>;

    /// Fetch one page of resources matching a filter string.
    async fn list(&self, query: &str, page_token: Option<&str>) -> AppResult<FilePage>;

    /// Create a resource without content (typically a folder).
    async fn create(&self, metadata: &ResourceMetadata) -> AppResult<RemoteResource>;

    /// Create a resource and upload its content.
    async fn create_with_content(
        &self,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource>;

    /// Update a resource's metadata.
    async fn update(&self, id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource>;

    /// Update a resource's metadata and replace its content.
    async fn update_with_content(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource>;

    /// Copy a file; `metadata` describes the new resource.
    async fn copy(&self, source_id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource>;

    /// Permanently delete a resource.
    async fn delete(&self, id: &str) -> AppResult<()>;

    /// Stream a file's content.
    async fn download(&self, id: &str) -> AppResult<ByteStream>;

    /// Stream a remote-native document converted to `mime_type`.
    async fn export(&self, id: &str, mime_type: &str) -> AppResult<ByteStream>;
}
