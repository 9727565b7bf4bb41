//! Delete, update, rename and copy, with cache invalidation.

use tracing::info;

use drivepath_cache::{join_path, split_path};
use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::types::{RemoteResource, ResourceMetadata};
use drivepath_query::Query;

use crate::context::CallContext;
use crate::service::DriveService;

/// Where a copy lands.
#[derive(Debug, Clone, Copy)]
pub enum CopyDestination<'a> {
    /// A folder path, resolved before copying.
    Path(&'a str),
    /// An already resolved folder.
    Folder(&'a RemoteResource),
}

impl<'a> From<&'a str> for CopyDestination<'a> {
    fn from(path: &'a str) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a RemoteResource> for CopyDestination<'a> {
    fn from(folder: &'a RemoteResource) -> Self {
        Self::Folder(folder)
    }
}

impl DriveService {
    /// Delete a resource and drop every cached path at or below it.
    pub async fn delete_resource(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
    ) -> AppResult<()> {
        ctx.run(self.remote.delete(&resource.id)).await?;

        if let Some(path) = self.cache.delete_by_id(&resource.id).await {
            if resource.is_folder() {
                self.cache.delete_subtree(&path).await;
            }
        }
        info!(id = %resource.id, name = %resource.name, "Resource deleted");
        Ok(())
    }

    /// Delete whatever resolves at `path`; `NotFound` if nothing does.
    pub async fn delete_path(
        &self,
        ctx: &CallContext,
        path: &str,
        filter: Option<&Query>,
    ) -> AppResult<RemoteResource> {
        let resource = self
            .find_path(ctx, path, filter)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Nothing found at '{path}'")))?;
        self.delete_resource(ctx, &resource).await?;
        Ok(resource)
    }

    /// Push the local name and properties of `resource` to the remote drive.
    ///
    /// When the name changed, the old cached path and every cached path below
    /// it are dropped and the new path is cached.
    pub async fn update_resource(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
    ) -> AppResult<RemoteResource> {
        let metadata = ResourceMetadata {
            name: Some(resource.name.clone()),
            properties: resource.properties.clone(),
            ..ResourceMetadata::default()
        };
        let updated = ctx.run(self.remote.update(&resource.id, &metadata)).await?;

        if let Some(old_path) = self.cache.get_path(&updated.id).await {
            if let Some((ancestor, old_name)) = split_path(&old_path) {
                if old_name != updated.name {
                    self.cache.delete_subtree(&old_path).await;
                    let new_path = join_path(ancestor.as_deref().unwrap_or(""), &updated.name);
                    self.cache.add(&updated.id, &new_path).await;
                    info!(id = %updated.id, from = %old_name, to = %updated.name, "Resource renamed");
                }
            }
        }
        Ok(updated)
    }

    /// Rename a resource.
    pub async fn rename_resource(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        new_name: &str,
    ) -> AppResult<RemoteResource> {
        if new_name.trim().is_empty() || new_name.contains(['/', '\\']) {
            return Err(AppError::validation(format!("Invalid name '{new_name}'")));
        }
        let mut renamed = resource.clone();
        renamed.name = new_name.to_string();
        self.update_resource(ctx, &renamed).await
    }

    /// Copy a file into a folder, keeping its name and properties.
    ///
    /// Folders cannot be copied; that is rejected before any remote call.
    pub async fn copy_resource(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
        destination: CopyDestination<'_>,
    ) -> AppResult<RemoteResource> {
        if resource.is_folder() {
            return Err(AppError::unsupported(format!(
                "'{}' is a folder; folders cannot be copied",
                resource.name
            )));
        }

        let folder_id = match destination {
            CopyDestination::Folder(folder) if folder.is_folder() => folder.id.clone(),
            CopyDestination::Folder(other) => {
                return Err(AppError::validation(format!(
                    "Copy destination '{}' is not a folder",
                    other.name
                )));
            }
            CopyDestination::Path(path) => self
                .find_folder(ctx, path, None)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Folder '{path}' not found")))?
                .id,
        };

        let metadata = ResourceMetadata {
            name: Some(resource.name.clone()),
            parent_id: Some(folder_id),
            properties: resource.properties.clone(),
            ..ResourceMetadata::default()
        };
        let copied = ctx.run(self.remote.copy(&resource.id, &metadata)).await?;
        info!(source = %resource.id, id = %copied.id, "Resource copied");
        Ok(copied)
    }
}
