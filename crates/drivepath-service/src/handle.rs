//! A resource bound to the service that resolved it.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::io::AsyncWrite;

use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::types::{RemoteResource, ResourceKind, TransferCallbacks};
use drivepath_query::Query;

use crate::context::CallContext;
use crate::mutate::CopyDestination;
use crate::service::DriveService;
use crate::traverse::InnerResources;

/// One remote resource plus the operations that apply to it.
///
/// Mutating methods update the local copy from the remote response. The
/// local copy is never refreshed otherwise.
#[derive(Debug, Clone)]
pub struct DriveResource {
    service: DriveService,
    resource: RemoteResource,
}

impl DriveResource {
    pub(crate) fn new(service: DriveService, resource: RemoteResource) -> Self {
        Self { service, resource }
    }

    /// The local copy of the resource.
    pub fn resource(&self) -> &RemoteResource {
        &self.resource
    }

    /// Unbind the resource from its service.
    pub fn into_inner(self) -> RemoteResource {
        self.resource
    }

    /// Remote id.
    pub fn id(&self) -> &str {
        &self.resource.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.resource.name
    }

    /// Resolved kind.
    pub fn kind(&self) -> ResourceKind {
        self.resource.kind
    }

    /// Whether this resource is a folder.
    pub fn is_folder(&self) -> bool {
        self.resource.is_folder()
    }

    /// Set a property locally; [`update`](Self::update) pushes it.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.resource.properties.insert(key.into(), value.into());
    }

    /// Full path of this resource, memoized on the handle.
    pub async fn full_name(&mut self, ctx: &CallContext) -> AppResult<String> {
        if let Some(name) = &self.resource.cached_full_name {
            return Ok(name.clone());
        }
        let name = self.service.full_name(ctx, &self.resource).await?;
        self.resource.cached_full_name = Some(name.clone());
        Ok(name)
    }

    /// The folder holding this resource; `None` at the root.
    pub async fn parent(&self, ctx: &CallContext) -> AppResult<Option<DriveResource>> {
        Ok(self
            .service
            .parent_of(ctx, &self.resource)
            .await?
            .map(|p| self.service.handle(p)))
    }

    /// Enumerate resources below this folder.
    pub fn inner_resources(
        &self,
        ctx: &CallContext,
        filter: Option<&Query>,
        deep: bool,
    ) -> InnerResources {
        self.service
            .inner_resources(ctx, &self.resource, filter, deep)
    }

    fn require_folder(&self) -> AppResult<()> {
        if self.is_folder() {
            Ok(())
        } else {
            Err(AppError::unsupported(format!(
                "'{}' is not a folder",
                self.resource.name
            )))
        }
    }

    async fn child_path(&mut self, ctx: &CallContext, name: &str) -> AppResult<String> {
        self.require_folder()?;
        let base = self.full_name(ctx).await?;
        Ok(format!("{base}/{name}"))
    }

    /// Create a folder inside this folder.
    pub async fn create_folder(
        &mut self,
        ctx: &CallContext,
        name: &str,
    ) -> AppResult<DriveResource> {
        let path = self.child_path(ctx, name).await?;
        let created = self.service.create_folder(ctx, &path).await?;
        Ok(self.service.handle(created))
    }

    /// Upload a new file inside this folder.
    pub async fn upload(
        &mut self,
        ctx: &CallContext,
        name: &str,
        content: Bytes,
        content_type: Option<&str>,
        properties: HashMap<String, String>,
        callbacks: &TransferCallbacks,
    ) -> AppResult<DriveResource> {
        let path = self.child_path(ctx, name).await?;
        let created = self
            .service
            .create_file(ctx, &path, content, content_type, properties, callbacks)
            .await?;
        Ok(self.service.handle(created))
    }

    /// Push the local name and properties.
    pub async fn update(&mut self, ctx: &CallContext) -> AppResult<()> {
        self.resource = self.service.update_resource(ctx, &self.resource).await?;
        Ok(())
    }

    /// Rename this resource.
    pub async fn rename(&mut self, ctx: &CallContext, new_name: &str) -> AppResult<()> {
        self.resource = self
            .service
            .rename_resource(ctx, &self.resource, new_name)
            .await?;
        Ok(())
    }

    /// Replace this file's content.
    pub async fn update_content(
        &mut self,
        ctx: &CallContext,
        content: Bytes,
        content_type: Option<&str>,
        callbacks: &TransferCallbacks,
    ) -> AppResult<()> {
        self.resource = self
            .service
            .update_content(ctx, &self.resource, content, content_type, callbacks)
            .await?;
        Ok(())
    }

    /// Copy this file into a folder. Folders are rejected without a remote call.
    pub async fn copy_to(
        &self,
        ctx: &CallContext,
        destination: CopyDestination<'_>,
    ) -> AppResult<DriveResource> {
        let copied = self
            .service
            .copy_resource(ctx, &self.resource, destination)
            .await?;
        Ok(self.service.handle(copied))
    }

    /// Delete this resource.
    pub async fn delete(self, ctx: &CallContext) -> AppResult<()> {
        self.service.delete_resource(ctx, &self.resource).await
    }

    /// Download this file's content into memory.
    pub async fn download(
        &self,
        ctx: &CallContext,
        callbacks: &TransferCallbacks,
    ) -> AppResult<Bytes> {
        self.service.download(ctx, &self.resource, callbacks).await
    }

    /// Stream this file's content into `writer`; returns the bytes written.
    pub async fn download_to<W>(
        &self,
        ctx: &CallContext,
        writer: &mut W,
        callbacks: &TransferCallbacks,
    ) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.service
            .download_to(ctx, &self.resource, writer, callbacks)
            .await
    }

    /// Export this native document, to its default kind when `target` is `None`.
    pub async fn export(
        &self,
        ctx: &CallContext,
        target: Option<ResourceKind>,
        callbacks: &TransferCallbacks,
    ) -> AppResult<Bytes> {
        self.service
            .export(ctx, &self.resource, target, callbacks)
            .await
    }
}

impl DriveService {
    /// Resolve `path` to a bound resource, through the path cache.
    pub async fn open(&self, ctx: &CallContext, path: &str) -> AppResult<Option<DriveResource>> {
        Ok(self
            .find_path(ctx, path, None)
            .await?
            .map(|r| self.handle(r)))
    }

    /// Resolve `path`, failing with `NotFound` when nothing is there.
    pub async fn open_required(&self, ctx: &CallContext, path: &str) -> AppResult<DriveResource> {
        self.open(ctx, path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nothing found at '{path}'")))
    }
}
