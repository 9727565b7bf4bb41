//! In-memory implementation of the remote drive.
//!
//! Behaves like the Drive API closely enough for the service layer: list
//! queries are parsed and evaluated with `drivepath-query`, results are
//! paginated, deletes cascade to descendants and native documents can only
//! be exported. Every trait call is counted so tests can assert round trips.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use futures::stream;
use tracing::debug;

use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::traits::{ByteStream, RemoteDrive};
use drivepath_core::types::{
    FilePage, ROOT_ID, RemoteResource, ResourceKind, ResourceMetadata, TransferCallbacks,
};

const DOWNLOAD_CHUNK: usize = 64 * 1024;
const DEFAULT_PAGE_SIZE: usize = 100;
const EPOCH_SECONDS: i64 = 1_704_067_200;

/// A remote-drive operation, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    List,
    Create,
    CreateWithContent,
    Update,
    UpdateWithContent,
    Copy,
    Delete,
    Download,
    Export,
}

/// Number of calls made per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: usize,
    pub list: usize,
    pub create: usize,
    pub create_with_content: usize,
    pub update: usize,
    pub update_with_content: usize,
    pub copy: usize,
    pub delete: usize,
    pub download: usize,
    pub export: usize,
}

impl CallCounts {
    fn bump(&mut self, op: Operation) {
        *self.slot(op) += 1;
    }

    fn slot(&mut self, op: Operation) -> &mut usize {
        match op {
            Operation::Get => &mut self.get,
            Operation::List => &mut self.list,
            Operation::Create => &mut self.create,
            Operation::CreateWithContent => &mut self.create_with_content,
            Operation::Update => &mut self.update,
            Operation::UpdateWithContent => &mut self.update_with_content,
            Operation::Copy => &mut self.copy,
            Operation::Delete => &mut self.delete,
            Operation::Download => &mut self.download,
            Operation::Export => &mut self.export,
        }
    }

    /// Calls made to one operation.
    pub fn of(&self, op: Operation) -> usize {
        let mut copy = *self;
        *copy.slot(op)
    }

    /// Calls across every operation.
    pub fn total(&self) -> usize {
        self.get
            + self.list
            + self.create
            + self.create_with_content
            + self.update
            + self.update_with_content
            + self.copy
            + self.delete
            + self.download
            + self.export
    }
}

#[derive(Debug, Default)]
struct State {
    resources: HashMap<String, RemoteResource>,
    order: Vec<String>,
    contents: HashMap<String, Bytes>,
    counts: CallCounts,
    failures: HashMap<Operation, VecDeque<AppError>>,
    scheduled: HashMap<(Operation, usize), AppError>,
    queries: Vec<String>,
    next_id: u64,
    root: Option<RemoteResource>,
}

impl State {
    fn allocate(&mut self) -> (String, DateTime<Utc>) {
        self.next_id += 1;
        let created = DateTime::UNIX_EPOCH + TimeDelta::seconds(EPOCH_SECONDS + self.next_id as i64);
        (format!("mem-{}", self.next_id), created)
    }

    fn insert(&mut self, resource: RemoteResource, content: Option<Bytes>) -> RemoteResource {
        if !self.resources.contains_key(&resource.id) {
            self.order.push(resource.id.clone());
        }
        if let Some(content) = content {
            self.contents.insert(resource.id.clone(), content);
        }
        self.resources.insert(resource.id.clone(), resource.clone());
        resource
    }

    fn lookup(&self, id: &str) -> AppResult<&RemoteResource> {
        self.resources
            .get(id)
            .or_else(|| self.root.as_ref().filter(|root| id == ROOT_ID || id == root.id))
            .ok_or_else(|| AppError::not_found(format!("File not found: {id}")))
    }

    fn is_root(&self, id: &str) -> bool {
        id == ROOT_ID || self.root.as_ref().is_some_and(|root| root.id == id)
    }

    /// Parent id as stored: the `root` alias becomes the root folder's id.
    fn canonical_parent(&self, parent_id: Option<&str>) -> String {
        match (parent_id, &self.root) {
            (None | Some(ROOT_ID), Some(root)) => root.id.clone(),
            (None, None) => ROOT_ID.to_string(),
            (Some(parent), _) => parent.to_string(),
        }
    }

    fn check_parent(&self, parent_id: &str) -> AppResult<()> {
        if self.is_root(parent_id) {
            return Ok(());
        }
        let parent = self.lookup(parent_id)?;
        if !parent.is_folder() {
            return Err(AppError::remote(format!("Parent {parent_id} is not a folder")));
        }
        Ok(())
    }

    fn descendants(&self, id: &str) -> Vec<String> {
        let mut found = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < found.len() {
            let current = found[cursor].clone();
            found.extend(
                self.order
                    .iter()
                    .filter(|child| {
                        self.resources
                            .get(*child)
                            .and_then(|r| r.parent_id.as_deref())
                            == Some(current.as_str())
                    })
                    .cloned(),
            );
            cursor += 1;
        }
        found
    }

    fn apply(&self, resource: &mut RemoteResource, metadata: &ResourceMetadata) {
        if let Some(name) = &metadata.name {
            resource.name = name.clone();
        }
        if let Some(mime) = &metadata.mime_type {
            resource.mime_type = mime.clone();
            resource.kind = ResourceKind::from_mime_type(mime);
        }
        if let Some(parent) = &metadata.parent_id {
            resource.parent_id = Some(self.canonical_parent(Some(parent)));
        }
        resource.properties.extend(
            metadata
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }
}

fn mime_for(metadata: &ResourceMetadata, fallback: Option<&str>) -> String {
    if let Some(mime) = &metadata.mime_type {
        return mime.clone();
    }
    if let Some(mime) = fallback {
        return mime.to_string();
    }
    let by_name = metadata
        .name
        .as_deref()
        .map(ResourceKind::from_file_name)
        .unwrap_or(ResourceKind::Unknown);
    if by_name == ResourceKind::Unknown {
        "application/octet-stream".to_string()
    } else {
        by_name.mime_type().to_string()
    }
}

fn chunked(content: Bytes) -> ByteStream {
    let chunks: Vec<Result<Bytes, std::io::Error>> = (0..content.len())
        .step_by(DOWNLOAD_CHUNK)
        .map(|start| Ok(content.slice(start..(start + DOWNLOAD_CHUNK).min(content.len()))))
        .collect();
    Box::pin(stream::iter(chunks))
}

/// In-memory remote drive.
///
/// By default top-level resources record the `root` alias as their parent.
/// [`with_root_folder`](MemoryDrive::with_root_folder) gives the root a
/// concrete id instead, as the Drive API reports it.
#[derive(Debug)]
pub struct MemoryDrive {
    state: Mutex<State>,
    page_size: usize,
}

impl Default for MemoryDrive {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDrive {
    /// An empty drive with the default page size.
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// An empty drive that returns at most `page_size` resources per page.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: page_size.max(1),
        }
    }

    /// Give the root folder a concrete id. Top-level resources then record
    /// that id as their parent, while `'root' in parents` still matches them.
    pub fn with_root_folder(self, id: &str) -> Self {
        self.lock().root = Some(RemoteResource::new(id, "My Drive", ResourceKind::Folder, None));
        self
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn enter(&self, op: Operation) -> AppResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.counts.bump(op);
        let call = state.counts.of(op);
        if let Some(err) = state.scheduled.remove(&(op, call)) {
            debug!(operation = ?op, call, error = %err, "Scheduled failure");
            return Err(err);
        }
        if let Some(err) = state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            debug!(operation = ?op, error = %err, "Injected failure");
            return Err(err);
        }
        Ok(state)
    }

    fn seed_with(
        &self,
        name: &str,
        parent: Option<&str>,
        kind: ResourceKind,
        content: Option<Bytes>,
    ) -> RemoteResource {
        let mut state = self.lock();
        let (id, created) = state.allocate();
        let parent = state.canonical_parent(parent);
        let mut resource = RemoteResource::new(id, name, kind, Some(parent));
        resource.created_time = Some(created);
        if !kind.is_folder() {
            resource.size = Some(content.as_ref().map(|c| c.len() as u64).unwrap_or(0));
        }
        state.insert(resource, content)
    }

    /// Add a folder without counting a call.
    pub fn seed_folder(&self, name: &str, parent: Option<&str>) -> RemoteResource {
        self.seed_with(name, parent, ResourceKind::Folder, None)
    }

    /// Add a file whose kind follows its extension, without counting a call.
    pub fn seed_file(
        &self,
        name: &str,
        parent: Option<&str>,
        content: impl Into<Bytes>,
    ) -> RemoteResource {
        let kind = ResourceKind::from_file_name(name);
        self.seed_with(name, parent, kind, Some(content.into()))
    }

    /// Add a resource of any kind with a reported size and no content.
    pub fn seed_kind(
        &self,
        name: &str,
        parent: Option<&str>,
        kind: ResourceKind,
        size: Option<u64>,
    ) -> RemoteResource {
        let mut resource = self.seed_with(name, parent, kind, None);
        if !kind.is_folder() {
            resource.size = size;
            self.lock().insert(resource.clone(), None);
        }
        resource
    }

    /// Add a resource exactly as given.
    pub fn seed(&self, resource: RemoteResource) -> RemoteResource {
        self.lock().insert(resource, None)
    }

    /// Move a resource to the trash.
    pub fn trash(&self, id: &str) {
        if let Some(resource) = self.lock().resources.get_mut(id) {
            resource.is_trashed = true;
        }
    }

    /// Make the next call of `op` fail with `err`. Failures queue up.
    pub fn fail_next(&self, op: Operation, err: AppError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }

    /// Make call number `call` (1-based, counted since the last reset) of
    /// `op` fail with `err`.
    pub fn fail_at(&self, op: Operation, call: usize, err: AppError) {
        self.lock().scheduled.insert((op, call), err);
    }

    /// Calls made so far.
    pub fn counts(&self) -> CallCounts {
        self.lock().counts
    }

    /// Zero the call counters.
    pub fn reset_counts(&self) {
        self.lock().counts = CallCounts::default();
    }

    /// Every query string passed to `list`, in call order.
    pub fn list_queries(&self) -> Vec<String> {
        self.lock().queries.clone()
    }

    /// Read a resource without counting a call.
    pub fn peek(&self, id: &str) -> Option<RemoteResource> {
        self.lock().resources.get(id).cloned()
    }

    /// Stored content of a file.
    pub fn content(&self, id: &str) -> Option<Bytes> {
        self.lock().contents.get(id).cloned()
    }

    /// Number of resources, trashed ones included.
    pub fn len(&self) -> usize {
        self.lock().resources.len()
    }

    /// Whether the drive holds no resources.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RemoteDrive for MemoryDrive {
    async fn get(&self, id: &str) -> AppResult<RemoteResource> {
        let state = self.enter(Operation::Get)?;
        state.lookup(id).cloned()
    }

    async fn list(&self, query: &str, page_token: Option<&str>) -> AppResult<FilePage> {
        let mut state = self.enter(Operation::List)?;
        state.queries.push(query.to_string());

        let mut expr = drivepath_query::parse(query)?;
        if let Some(root) = &state.root {
            expr = expr.alias_root(&root.id);
        }
        let offset = match page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| AppError::validation(format!("Invalid page token: {token}")))?,
            None => 0,
        };

        let matching: Vec<RemoteResource> = state
            .order
            .iter()
            .filter_map(|id| state.resources.get(id))
            .filter(|r| expr.matches(r))
            .cloned()
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let resources = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_page_token = (end < matching.len()).then(|| end.to_string());

        Ok(FilePage {
            resources,
            next_page_token,
        })
    }

    async fn create(&self, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        let mut state = self.enter(Operation::Create)?;
        let name = metadata
            .name
            .clone()
            .ok_or_else(|| AppError::validation("A name is required"))?;
        let parent = state.canonical_parent(metadata.parent_id.as_deref());
        state.check_parent(&parent)?;

        let (id, created) = state.allocate();
        let mime = mime_for(metadata, None);
        let kind = ResourceKind::from_mime_type(&mime);
        let mut resource = RemoteResource::new(id, name, kind, Some(parent));
        resource.mime_type = mime;
        resource.properties = metadata.properties.clone();
        resource.created_time = Some(created);
        if !kind.is_folder() {
            resource.size = Some(0);
        }
        Ok(state.insert(resource, None))
    }

    async fn create_with_content(
        &self,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let created = {
            let mut state = self.enter(Operation::CreateWithContent)?;
            let name = metadata
                .name
                .clone()
                .ok_or_else(|| AppError::validation("A name is required"))?;
            let parent = state.canonical_parent(metadata.parent_id.as_deref());
            state.check_parent(&parent)?;

            let (id, created) = state.allocate();
            let mime = mime_for(metadata, Some(content_type));
            let kind = ResourceKind::from_mime_type(&mime);
            let mut resource = RemoteResource::new(id, name, kind, Some(parent));
            resource.mime_type = mime;
            resource.properties = metadata.properties.clone();
            resource.created_time = Some(created);
            resource.size = Some(content.len() as u64);
            state.insert(resource, Some(content.clone()))
        };
        let len = content.len() as u64;
        callbacks.progress(len, Some(len));
        Ok(created)
    }

    async fn update(&self, id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        let mut state = self.enter(Operation::Update)?;
        if let Some(parent) = &metadata.parent_id {
            state.check_parent(parent)?;
        }
        let mut resource = state.lookup(id)?.clone();
        state.apply(&mut resource, metadata);
        Ok(state.insert(resource, None))
    }

    async fn update_with_content(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
        content: Bytes,
        _content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let updated = {
            let mut state = self.enter(Operation::UpdateWithContent)?;
            let mut resource = state.lookup(id)?.clone();
            if resource.is_folder() {
                return Err(AppError::remote("Folders have no content"));
            }
            state.apply(&mut resource, metadata);
            resource.size = Some(content.len() as u64);
            state.insert(resource, Some(content.clone()))
        };
        let len = content.len() as u64;
        callbacks.progress(len, Some(len));
        Ok(updated)
    }

    async fn copy(&self, source_id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        let mut state = self.enter(Operation::Copy)?;
        let source = state.lookup(source_id)?.clone();
        if source.is_folder() {
            return Err(AppError::remote("Folders cannot be copied"));
        }
        if let Some(parent) = &metadata.parent_id {
            state.check_parent(parent)?;
        }

        let (id, created) = state.allocate();
        let mut copy = source.clone();
        copy.id = id;
        copy.created_time = Some(created);
        copy.is_trashed = false;
        copy.cached_full_name = None;
        state.apply(&mut copy, metadata);
        let content = state.contents.get(source_id).cloned();
        Ok(state.insert(copy, content))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut state = self.enter(Operation::Delete)?;
        state.lookup(id)?;
        if state.is_root(id) {
            return Err(AppError::remote("The root folder cannot be deleted"));
        }
        let doomed = state.descendants(id);
        for gone in &doomed {
            state.resources.remove(gone);
            state.contents.remove(gone);
        }
        state.order.retain(|existing| !doomed.contains(existing));
        Ok(())
    }

    async fn download(&self, id: &str) -> AppResult<ByteStream> {
        let state = self.enter(Operation::Download)?;
        let resource = state.lookup(id)?;
        if resource.is_folder() {
            return Err(AppError::remote("Folders have no content"));
        }
        if resource.kind.is_exportable() {
            return Err(AppError::remote(
                "Only files with binary content can be downloaded; use export",
            ));
        }
        let content = state.contents.get(id).cloned().unwrap_or_default();
        Ok(chunked(content))
    }

    async fn export(&self, id: &str, mime_type: &str) -> AppResult<ByteStream> {
        let state = self.enter(Operation::Export)?;
        let resource = state.lookup(id)?;
        if !resource.kind.is_exportable() {
            return Err(AppError::remote(format!(
                "Export is only available for native documents, not {}",
                resource.mime_type
            )));
        }
        let content = match state.contents.get(id) {
            Some(content) => content.clone(),
            None => Bytes::from(format!("{} exported as {mime_type}", resource.name)),
        };
        Ok(chunked(content))
    }
}

#[cfg(test)]
mod tests {
    use drivepath_core::ErrorKind;
    use drivepath_query::Query;
    use futures::TryStreamExt;

    use super::*;

    #[tokio::test]
    async fn test_list_paginates() {
        let drive = MemoryDrive::with_page_size(2);
        for i in 0..5 {
            drive.seed_file(&format!("f{i}.txt"), None, "x");
        }
        let q = Query::new().is_parent(ROOT_ID).build();

        let first = drive.list(&q, None).await.unwrap();
        assert_eq!(first.resources.len(), 2);
        let second = drive
            .list(&q, first.next_page_token.as_deref())
            .await
            .unwrap();
        let third = drive
            .list(&q, second.next_page_token.as_deref())
            .await
            .unwrap();
        assert_eq!(third.resources.len(), 1);
        assert!(third.next_page_token.is_none());
        assert_eq!(drive.counts().list, 3);
    }

    #[tokio::test]
    async fn test_list_hides_trashed_by_default() {
        let drive = MemoryDrive::new();
        let gone = drive.seed_file("old.txt", None, "x");
        drive.trash(&gone.id);
        let live = drive.list(&Query::new().build(), None).await.unwrap();
        assert!(live.resources.is_empty());
        let trashed = drive
            .list(&Query::new().include_trashed(true).build(), None)
            .await
            .unwrap();
        assert_eq!(trashed.resources.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_query_is_validation_error() {
        let drive = MemoryDrive::new();
        let err = drive.list("size > 3", None).await.unwrap_err();
        assert!(err.is(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let drive = MemoryDrive::new();
        let a = drive.seed_folder("A", None);
        let b = drive.seed_folder("B", Some(&a.id));
        drive.seed_file("c.txt", Some(&b.id), "c");
        let keep = drive.seed_file("keep.txt", None, "k");

        drive.delete(&a.id).await.unwrap();
        assert_eq!(drive.len(), 1);
        assert!(drive.peek(&keep.id).is_some());
    }

    #[tokio::test]
    async fn test_create_under_missing_parent_fails() {
        let drive = MemoryDrive::new();
        let meta = ResourceMetadata::folder("x", Some("nope".into()));
        let err = drive.create(&meta).await.unwrap_err();
        assert!(err.is(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn test_download_returns_content() {
        let drive = MemoryDrive::new();
        let file = drive.seed_file("a.txt", None, vec![7u8; DOWNLOAD_CHUNK + 1]);
        let chunks: Vec<Bytes> = drive
            .download(&file.id)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), DOWNLOAD_CHUNK + 1);
    }

    #[tokio::test]
    async fn test_native_documents_only_export() {
        let drive = MemoryDrive::new();
        let doc = drive.seed_kind("Plan", None, ResourceKind::Document, None);
        assert!(drive.download(&doc.id).await.is_err());
        assert!(drive.export(&doc.id, "application/pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let drive = MemoryDrive::new();
        let file = drive.seed_file("a.txt", None, "a");
        drive.fail_next(Operation::Get, AppError::transient("503"));
        assert!(drive.get(&file.id).await.unwrap_err().is_retryable());
        assert!(drive.get(&file.id).await.is_ok());
        assert_eq!(drive.counts().get, 2);
    }

    #[tokio::test]
    async fn test_root_folder_id_answers_root_alias() {
        let drive = MemoryDrive::new().with_root_folder("my-drive");
        let top = drive.seed_file("a.txt", None, "a");
        assert_eq!(top.parent_id.as_deref(), Some("my-drive"));

        let q = Query::new().is_parent(ROOT_ID).build();
        let page = drive.list(&q, None).await.unwrap();
        assert_eq!(page.resources.len(), 1);
        let q = Query::new().is_parent("my-drive").build();
        assert_eq!(drive.list(&q, None).await.unwrap().resources.len(), 1);

        let created = drive
            .create(&ResourceMetadata::folder("B", Some(ROOT_ID.into())))
            .await
            .unwrap();
        assert_eq!(created.parent_id.as_deref(), Some("my-drive"));
        assert!(drive.get("my-drive").await.unwrap().is_folder());
        assert!(drive.delete("my-drive").await.is_err());
        assert_eq!(drive.len(), 2);
    }

    #[tokio::test]
    async fn test_scheduled_failure_hits_only_that_call() {
        let drive = MemoryDrive::new();
        drive.fail_at(Operation::List, 2, AppError::remote("boom"));
        let q = Query::new().build();
        assert!(drive.list(&q, None).await.is_ok());
        assert!(drive.list(&q, None).await.is_err());
        assert!(drive.list(&q, None).await.is_ok());
        assert_eq!(drive.counts().of(Operation::List), 3);
    }
}
