//! The drive service and its listing primitives.

use std::sync::Arc;

use tracing::{debug, info};

use drivepath_cache::PathCache;
use drivepath_core::config::ExportConfig;
use drivepath_core::result::AppResult;
use drivepath_core::traits::RemoteDrive;
use drivepath_core::types::{ROOT_ID, RemoteResource, ResourceKind};
use drivepath_query::Query;

use crate::context::CallContext;
use crate::handle::DriveResource;

/// Path-oriented operations over a remote drive.
///
/// Cheap to clone; clones share the remote drive and the path cache.
#[derive(Debug, Clone)]
pub struct DriveService {
    /// The remote drive.
    pub(crate) remote: Arc<dyn RemoteDrive>,
    /// Path/id cache shared by every clone.
    pub(crate) cache: Arc<PathCache>,
    /// Export preconditions.
    pub(crate) export: ExportConfig,
}

impl DriveService {
    /// Creates a new drive service.
    pub fn new(remote: Arc<dyn RemoteDrive>, cache: Arc<PathCache>, export: ExportConfig) -> Self {
        Self {
            remote,
            cache,
            export,
        }
    }

    /// The remote drive.
    pub fn remote(&self) -> &Arc<dyn RemoteDrive> {
        &self.remote
    }

    /// The path cache.
    pub fn cache(&self) -> &Arc<PathCache> {
        &self.cache
    }

    /// The root folder, addressed through its alias.
    pub fn root_folder(&self) -> RemoteResource {
        RemoteResource::new(ROOT_ID, "", ResourceKind::Folder, None)
    }

    /// Bind a resource to this service.
    pub fn handle(&self, resource: RemoteResource) -> DriveResource {
        DriveResource::new(self.clone(), resource)
    }

    /// Every resource matching `query`, across all pages.
    pub async fn query_resources(
        &self,
        ctx: &CallContext,
        query: &Query,
    ) -> AppResult<Vec<RemoteResource>> {
        let q = query.build();
        let mut resources = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = ctx.run(self.remote.list(&q, token.as_deref())).await?;
            resources.extend(page.resources);
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        debug!(query = %q, count = resources.len(), "Listed resources");
        Ok(resources)
    }

    /// The single best match for `query`.
    ///
    /// Several matches are legal (names are not unique within a folder). The
    /// earliest created wins; resources without a creation time come after
    /// those with one, and listing order breaks the remaining ties.
    pub(crate) async fn first_match(
        &self,
        ctx: &CallContext,
        query: &Query,
    ) -> AppResult<Option<RemoteResource>> {
        let matches = self.query_resources(ctx, query).await?;
        if matches.len() > 1 {
            debug!(count = matches.len(), "Ambiguous lookup, picking earliest created");
        }
        Ok(matches
            .into_iter()
            .min_by_key(|r| (r.created_time.is_none(), r.created_time)))
    }

    /// Store the path cache snapshot if the cache persists.
    pub async fn shutdown(&self) -> AppResult<()> {
        if self.cache.snapshot_path().is_none() {
            return Ok(());
        }
        self.cache.store().await?;
        info!("Drive service shut down");
        Ok(())
    }
}
