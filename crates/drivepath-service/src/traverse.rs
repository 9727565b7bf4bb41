//! Lazy enumeration of a folder's contents.
//!
//! A producer task walks the tree and sends matching resources through a
//! bounded channel, so the caller can consume while the walk continues and a
//! slow consumer throttles the producer. In deep mode the walk is
//! breadth-first: for each folder, the probe for its subfolders and the
//! listing of its matching children run concurrently, and the next folder is
//! taken only after both finish.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use drivepath_core::result::AppResult;
use drivepath_core::types::{RemoteResource, ResourceKind};
use drivepath_query::Query;

use crate::context::CallContext;
use crate::service::DriveService;

const CHANNEL_CAPACITY: usize = 64;

/// Stream of resources below a folder.
///
/// Ends after the last resource, or after yielding one `Err` when a remote
/// call fails; resources yielded before the failure stand. Dropping the
/// stream stops the walk. A stream cannot be restarted.
#[derive(Debug)]
pub struct InnerResources {
    rx: mpsc::Receiver<AppResult<RemoteResource>>,
    task: Option<JoinHandle<()>>,
}

impl InnerResources {
    fn empty() -> Self {
        let (_, rx) = mpsc::channel(1);
        Self { rx, task: None }
    }

    /// Collect the whole stream, stopping at the first error.
    pub async fn collect_all(mut self) -> AppResult<Vec<RemoteResource>> {
        let mut out = Vec::new();
        while let Some(item) = self.rx.recv().await {
            out.push(item?);
        }
        Ok(out)
    }
}

impl Stream for InnerResources {
    type Item = AppResult<RemoteResource>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for InnerResources {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

type Sender = mpsc::Sender<AppResult<RemoteResource>>;

impl DriveService {
    /// Enumerate resources below `folder` that match `filter`.
    ///
    /// Shallow mode lists direct children only; deep mode descends into every
    /// subfolder. A non-folder yields an empty stream. Must be called inside
    /// a Tokio runtime.
    pub fn inner_resources(
        &self,
        ctx: &CallContext,
        folder: &RemoteResource,
        filter: Option<&Query>,
        deep: bool,
    ) -> InnerResources {
        if !folder.is_folder() {
            return InnerResources::empty();
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let service = self.clone();
        let ctx = ctx.child();
        let folder_id = folder.id.clone();
        let filter = filter.cloned().unwrap_or_default();

        let task = tokio::spawn(async move {
            let walk = if deep {
                service.walk_deep(&ctx, folder_id, &filter, &tx).await
            } else {
                service
                    .send_matches(&ctx, &folder_id, &filter, &tx)
                    .await
                    .map(|_| ())
            };
            if let Err(e) = walk {
                debug!(error = %e, "Traversal aborted");
                let _ = tx.send(Err(e)).await;
            }
        });

        InnerResources {
            rx,
            task: Some(task),
        }
    }

    async fn walk_deep(
        &self,
        ctx: &CallContext,
        root_id: String,
        filter: &Query,
        tx: &Sender,
    ) -> AppResult<()> {
        let mut queue = VecDeque::from([root_id]);
        while let Some(folder_id) = queue.pop_front() {
            let probe = Query::new()
                .is_parent(&folder_id)
                .and()
                .is_type(ResourceKind::Folder);
            let (subfolders, sent) = tokio::join!(
                self.query_resources(ctx, &probe),
                self.send_matches(ctx, &folder_id, filter, tx),
            );
            if !sent? {
                return Ok(());
            }
            queue.extend(subfolders?.into_iter().map(|f| f.id));
        }
        Ok(())
    }

    /// Send every child of `folder_id` matching `filter`, page by page.
    ///
    /// Returns `false` once the receiver is gone.
    async fn send_matches(
        &self,
        ctx: &CallContext,
        folder_id: &str,
        filter: &Query,
        tx: &Sender,
    ) -> AppResult<bool> {
        let q = Query::new()
            .include_trashed(filter.includes_trashed())
            .is_parent(folder_id)
            .and_group(Some(filter))
            .build();
        let mut token: Option<String> = None;
        loop {
            let page = ctx.run(self.remote.list(&q, token.as_deref())).await?;
            for resource in page.resources {
                if tx.send(Ok(resource)).await.is_err() {
                    return Ok(false);
                }
            }
            match page.next_page_token {
                Some(next) => token = Some(next),
                None => return Ok(true),
            }
        }
    }
}
