//! Uploads, downloads and exports.

use std::collections::HashMap;

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::info;

use drivepath_cache::{normalize_path, split_path};
use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::traits::ByteStream;
use drivepath_core::types::{RemoteResource, ResourceKind, ResourceMetadata, TransferCallbacks};

use crate::context::CallContext;
use crate::service::DriveService;

const OCTET_STREAM: &str = "application/octet-stream";

fn content_type_for(name: &str) -> &'static str {
    match ResourceKind::from_file_name(name) {
        ResourceKind::Unknown => OCTET_STREAM,
        kind => kind.mime_type(),
    }
}

/// Report the outcome of a transfer to `callbacks` before returning it.
fn reported<T>(result: AppResult<T>, callbacks: &TransferCallbacks) -> AppResult<T> {
    if let Err(e) = &result {
        callbacks.failure(e);
    }
    result
}

impl DriveService {
    /// Upload `content` as a new file at `path`, creating missing folders.
    ///
    /// Without an explicit `content_type` the type follows the file
    /// extension.
    pub async fn create_file(
        &self,
        ctx: &CallContext,
        path: &str,
        content: Bytes,
        content_type: Option<&str>,
        properties: HashMap<String, String>,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let result: AppResult<RemoteResource> = async move {
            let (ancestor, leaf) = split_path(path)
                .ok_or_else(|| AppError::validation("A destination path is required"))?;
            let parent_id = self.ensure_parent_id(ctx, ancestor.as_deref()).await?;
            let content_type = content_type.unwrap_or_else(|| content_type_for(&leaf));
            let metadata = ResourceMetadata::file(leaf, Some(parent_id), properties);

            let size = content.len();
            let created = ctx
                .run(
                    self.remote
                        .create_with_content(&metadata, content, content_type, callbacks),
                )
                .await?;
            self.cache.add(&created.id, &normalize_path(path)).await;
            info!(path = %path, id = %created.id, size, "File uploaded");
            Ok(created)
        }
        .await;
        reported(result, callbacks)
    }

    /// Replace the content of an existing file.
    pub async fn update_content(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        content: Bytes,
        content_type: Option<&str>,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let result: AppResult<RemoteResource> = async move {
            if resource.is_folder() {
                return Err(AppError::unsupported("Folders have no content"));
            }
            let content_type = content_type.unwrap_or(resource.mime_type.as_str());
            ctx.run(self.remote.update_with_content(
                &resource.id,
                &ResourceMetadata::default(),
                content,
                content_type,
                callbacks,
            ))
            .await
        }
        .await;
        reported(result, callbacks)
    }

    /// Download a file into memory.
    pub async fn download(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        callbacks: &TransferCallbacks,
    ) -> AppResult<Bytes> {
        let mut buffer = Vec::with_capacity(resource.size.unwrap_or(0) as usize);
        self.download_to(ctx, resource, &mut buffer, callbacks).await?;
        Ok(Bytes::from(buffer))
    }

    /// Download a file into `writer`; returns the number of bytes written.
    pub async fn download_to<W>(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        writer: &mut W,
        callbacks: &TransferCallbacks,
    ) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let result: AppResult<u64> = async move {
            if resource.is_folder() {
                return Err(AppError::unsupported(format!(
                    "'{}' is a folder and cannot be downloaded",
                    resource.name
                )));
            }
            if resource.kind.is_exportable() {
                return Err(AppError::unsupported(format!(
                    "'{}' is a native document; export it instead",
                    resource.name
                )));
            }
            let stream = ctx.run(self.remote.download(&resource.id)).await?;
            drain(ctx, stream, resource.size, writer, callbacks).await
        }
        .await;
        reported(result, callbacks)
    }

    /// Download the file at `path`; `None` when nothing resolves there.
    pub async fn download_path(
        &self,
        ctx: &CallContext,
        path: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<Option<Bytes>> {
        match self.find_file(ctx, path, None).await? {
            Some(resource) => Ok(Some(self.download(ctx, &resource, callbacks).await?)),
            None => Ok(None),
        }
    }

    /// Export a native document into memory.
    pub async fn export(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        target: Option<ResourceKind>,
        callbacks: &TransferCallbacks,
    ) -> AppResult<Bytes> {
        let mut buffer = Vec::new();
        self.export_to(ctx, resource, target, &mut buffer, callbacks)
            .await?;
        Ok(Bytes::from(buffer))
    }

    /// Export a native document into `writer`.
    ///
    /// `target` defaults to the kind's export format. Non-exportable kinds,
    /// targets that are not file formats and documents over the size limit
    /// are rejected before any remote call.
    pub async fn export_to<W>(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        target: Option<ResourceKind>,
        writer: &mut W,
        callbacks: &TransferCallbacks,
    ) -> AppResult<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let result: AppResult<u64> = async move {
            let target = match (resource.kind.default_export(), target) {
                (None, _) => {
                    return Err(AppError::export_not_supported(format!(
                        "'{}' ({}) cannot be exported",
                        resource.name, resource.mime_type
                    )));
                }
                (Some(default), None) => default,
                (Some(_), Some(target)) => target,
            };
            if !target.is_file_format() {
                return Err(AppError::export_not_supported(format!(
                    "'{}' cannot be exported as {target}",
                    resource.name
                )));
            }
            if let Some(size) = resource.size {
                if size > self.export.max_export_bytes {
                    return Err(AppError::export_too_large(format!(
                        "'{}' is {size} bytes; exports are limited to {} bytes",
                        resource.name, self.export.max_export_bytes
                    )));
                }
            }

            let stream = ctx
                .run(self.remote.export(&resource.id, target.mime_type()))
                .await?;
            let written = drain(ctx, stream, resource.size, writer, callbacks).await?;
            info!(id = %resource.id, target = %target, bytes = written, "Resource exported");
            Ok(written)
        }
        .await;
        reported(result, callbacks)
    }
}

/// Copy a byte stream into `writer`, reporting progress per chunk.
async fn drain<W>(
    ctx: &CallContext,
    mut stream: ByteStream,
    total: Option<u64>,
    writer: &mut W,
    callbacks: &TransferCallbacks,
) -> AppResult<u64>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut written = 0u64;
    while let Some(chunk) = ctx.run(async { Ok(stream.next().await) }).await? {
        let chunk = chunk.map_err(|e| {
            AppError::with_source(
                drivepath_core::ErrorKind::Transient,
                format!("Transfer interrupted: {e}"),
                e,
            )
        })?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
        callbacks.progress(written, total);
    }
    writer.flush().await?;
    Ok(written)
}
