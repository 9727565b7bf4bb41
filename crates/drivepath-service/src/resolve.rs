//! Path resolution.
//!
//! A path splits into an ancestor path and a leaf name. The ancestor resolves
//! recursively through [`DriveService::find_folder`], consulting the path
//! cache first; the leaf is then looked up with a name-and-parent query.
//! Lookups never create anything; only [`DriveService::create_folder`] and
//! [`DriveService::ensure_folder`] do.

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::{debug, info};

use drivepath_cache::{display_path, join_path, normalize_path, split_path};
use drivepath_core::error::{AppError, ErrorKind};
use drivepath_core::result::AppResult;
use drivepath_core::types::{ROOT_ID, RemoteResource, ResourceKind, ResourceMetadata};
use drivepath_query::Query;

use crate::context::CallContext;
use crate::service::DriveService;

/// What a cached lookup accepts at the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Folder,
    File,
    Any,
}

impl Shape {
    fn admits(self, resource: &RemoteResource) -> bool {
        match self {
            Shape::Folder => resource.is_folder(),
            Shape::File => !resource.is_folder(),
            Shape::Any => true,
        }
    }

    fn scope(self, filter: Option<&Query>) -> Option<Query> {
        match self {
            Shape::Folder => Some(Query::new().is_type(ResourceKind::Folder).and_group(filter)),
            Shape::File => Some(Query::new().is_not_type(ResourceKind::Folder).and_group(filter)),
            Shape::Any => filter.cloned(),
        }
    }
}

impl DriveService {
    /// Resolve a folder path.
    ///
    /// A cached id is confirmed with one `get`; the extra `filter` only
    /// applies to the remote search that runs on a miss or a stale entry.
    pub fn find_folder<'a>(
        &'a self,
        ctx: &'a CallContext,
        path: &'a str,
        filter: Option<&'a Query>,
    ) -> BoxFuture<'a, AppResult<Option<RemoteResource>>> {
        async move { self.find_cached(ctx, path, filter, Shape::Folder).await }.boxed()
    }

    /// Resolve a file (anything but a folder) path.
    pub async fn find_file(
        &self,
        ctx: &CallContext,
        path: &str,
        filter: Option<&Query>,
    ) -> AppResult<Option<RemoteResource>> {
        self.find_cached(ctx, path, filter, Shape::File).await
    }

    /// Resolve a path of either kind, caching the leaf like the folder and
    /// file lookups do.
    pub async fn find_path(
        &self,
        ctx: &CallContext,
        path: &str,
        filter: Option<&Query>,
    ) -> AppResult<Option<RemoteResource>> {
        self.find_cached(ctx, path, filter, Shape::Any).await
    }

    async fn find_cached(
        &self,
        ctx: &CallContext,
        path: &str,
        filter: Option<&Query>,
        shape: Shape,
    ) -> AppResult<Option<RemoteResource>> {
        let key = normalize_path(path);
        if key.is_empty() {
            return Ok(None);
        }

        if let Some(id) = self.cache.get_id(&key).await {
            match ctx.run(self.remote.get(&id)).await {
                Ok(hit) if !hit.is_trashed && shape.admits(&hit) => {
                    debug!(path = %key, id = %id, "Resolved from cache");
                    return Ok(Some(hit));
                }
                Ok(_) => debug!(path = %key, id = %id, "Cached resource is stale"),
                Err(e) if e.is(ErrorKind::NotFound) => {
                    debug!(path = %key, id = %id, "Cached resource is gone");
                }
                Err(e) => return Err(e),
            }
            self.cache.delete_by_path(&key).await;
        }

        let scoped = shape.scope(filter);
        let found = self.find_resource(ctx, &key, scoped.as_ref()).await?;

        if let Some(resource) = &found {
            if !resource.is_trashed {
                self.cache.add(&resource.id, &key).await;
            }
        }
        Ok(found)
    }

    /// Resolve any resource by path, constrained by `filter`.
    ///
    /// An unresolvable ancestor yields `Ok(None)`.
    pub async fn find_resource(
        &self,
        ctx: &CallContext,
        path: &str,
        filter: Option<&Query>,
    ) -> AppResult<Option<RemoteResource>> {
        let Some((ancestor, leaf)) = split_path(path) else {
            return Ok(None);
        };

        let parent_id = match ancestor {
            None => ROOT_ID.to_string(),
            Some(ancestor) => match self.find_folder(ctx, &ancestor, None).await? {
                Some(folder) => folder.id,
                None => {
                    debug!(path = %ancestor, "Ancestor not found");
                    return Ok(None);
                }
            },
        };

        let query = Query::new()
            .is_name(&leaf)
            .and()
            .is_parent(&parent_id)
            .and_group(filter);
        self.first_match(ctx, &query).await
    }

    /// Create a folder, creating missing ancestors.
    ///
    /// Fails with `AlreadyExists` when a live folder is already at `path`.
    pub async fn create_folder(&self, ctx: &CallContext, path: &str) -> AppResult<RemoteResource> {
        let key = normalize_path(path);
        if key.is_empty() {
            return Err(AppError::validation("Cannot create the root folder"));
        }
        if self.find_folder(ctx, &key, None).await?.is_some() {
            let (_, leaf) = split_path(&key).unwrap_or_default();
            return Err(AppError::already_exists(format!(
                "The folder '{leaf}' already exists at '{}'",
                display_path(&key)
            )));
        }
        self.create_folder_at(ctx, &key).await
    }

    /// Resolve a folder path, creating it and any missing ancestors.
    pub fn ensure_folder<'a>(
        &'a self,
        ctx: &'a CallContext,
        path: &'a str,
    ) -> BoxFuture<'a, AppResult<RemoteResource>> {
        async move {
            let key = normalize_path(path);
            if key.is_empty() {
                return Err(AppError::validation("Cannot create the root folder"));
            }
            match self.find_folder(ctx, &key, None).await? {
                Some(folder) => Ok(folder),
                None => self.create_folder_at(ctx, &key).await,
            }
        }
        .boxed()
    }

    /// Id of the folder that holds `ancestor`, creating it if missing.
    pub(crate) async fn ensure_parent_id(
        &self,
        ctx: &CallContext,
        ancestor: Option<&str>,
    ) -> AppResult<String> {
        match ancestor {
            None => Ok(ROOT_ID.to_string()),
            Some(ancestor) => Ok(self.ensure_folder(ctx, ancestor).await?.id),
        }
    }

    async fn create_folder_at(&self, ctx: &CallContext, key: &str) -> AppResult<RemoteResource> {
        let (ancestor, leaf) = split_path(key)
            .ok_or_else(|| AppError::validation("Cannot create the root folder"))?;
        let parent_id = self.ensure_parent_id(ctx, ancestor.as_deref()).await?;

        let metadata = ResourceMetadata::folder(leaf, Some(parent_id));
        let created = ctx.run(self.remote.create(&metadata)).await?;
        self.cache.add(&created.id, key).await;
        info!(path = %display_path(key), id = %created.id, "Folder created");
        Ok(created)
    }

    /// Fetch a resource by id.
    pub async fn get_resource(&self, ctx: &CallContext, id: &str) -> AppResult<RemoteResource> {
        ctx.run(self.remote.get(id)).await
    }

    /// The folder holding `resource`, or `None` at the root.
    ///
    /// The root folder itself has no parent link, so a parent without one is
    /// reported as `None` too.
    pub async fn parent_of(
        &self,
        ctx: &CallContext,
        resource: &RemoteResource,
    ) -> AppResult<Option<RemoteResource>> {
        match resource.parent_id.as_deref() {
            None | Some(ROOT_ID) => Ok(None),
            Some(parent_id) => {
                let parent = self.get_resource(ctx, parent_id).await?;
                Ok(parent.parent_id.is_some().then_some(parent))
            }
        }
    }

    /// Reconstruct the full path of `resource`, e.g. `"A/B/file.txt"`.
    ///
    /// The remote drive stores only parent links, so this walks up through
    /// parents. Results are cached, making repeat calls free.
    pub fn full_name<'a>(
        &'a self,
        ctx: &'a CallContext,
        resource: &'a RemoteResource,
    ) -> BoxFuture<'a, AppResult<String>> {
        async move {
            if let Some(name) = &resource.cached_full_name {
                return Ok(name.clone());
            }
            if let Some(path) = self.cache.get_path(&resource.id).await {
                return Ok(display_path(&path));
            }

            let parent_id = match resource.parent_id.as_deref() {
                None | Some(ROOT_ID) => return Ok(resource.name.clone()),
                Some(parent_id) => parent_id,
            };

            let at_root = Query::new()
                .is_name(&resource.name)
                .and()
                .is_parent(ROOT_ID)
                .include_trashed(resource.is_trashed);
            let root_matches = self.query_resources(ctx, &at_root).await?;
            if root_matches.iter().any(|r| r.id == resource.id) {
                self.cache.add(&resource.id, &resource.name).await;
                return Ok(resource.name.clone());
            }

            let parent = self.get_resource(ctx, parent_id).await?;
            let parent_name = self.full_name(ctx, &parent).await?;
            let full = join_path(&parent_name, &resource.name);
            self.cache.add(&resource.id, &full).await;
            Ok(display_path(&full))
        }
        .boxed()
    }
}
