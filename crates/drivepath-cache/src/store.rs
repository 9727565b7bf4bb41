//! The path cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use drivepath_core::config::PathCacheConfig;
use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;

use crate::path::normalize_path;
use crate::snapshot::{Snapshot, read_snapshot, write_snapshot};

#[derive(Debug, Default)]
struct Maps {
    id_to_path: HashMap<String, String>,
    path_to_id: HashMap<String, String>,
}

impl Maps {
    fn insert(&mut self, id: &str, path: String) {
        if let Some(old_path) = self.id_to_path.remove(id) {
            self.path_to_id.remove(&old_path);
        }
        if let Some(old_id) = self.path_to_id.remove(&path) {
            self.id_to_path.remove(&old_id);
        }
        self.id_to_path.insert(id.to_string(), path.clone());
        self.path_to_id.insert(path, id.to_string());
    }

    fn remove_id(&mut self, id: &str) -> Option<String> {
        let path = self.id_to_path.remove(id)?;
        self.path_to_id.remove(&path);
        Some(path)
    }

    fn remove_path(&mut self, path: &str) -> Option<String> {
        let id = self.path_to_id.remove(path)?;
        self.id_to_path.remove(&id);
        Some(id)
    }

    fn from_snapshot((id_to_path, path_to_id): Snapshot) -> Self {
        let mut maps = Self::default();
        for (id, path) in id_to_path {
            maps.insert(&id, normalize_path(&path));
        }
        if maps.path_to_id.len() != path_to_id.len()
            || path_to_id
                .iter()
                .any(|(p, id)| maps.path_to_id.get(p) != Some(id))
        {
            warn!("Path cache snapshot directions disagree, rebuilt from id map");
        }
        maps
    }

    fn to_snapshot(&self) -> Snapshot {
        (self.id_to_path.clone(), self.path_to_id.clone())
    }
}

/// Bidirectional map between normalized paths and resource ids.
///
/// Every id maps to at most one path and every path to at most one id.
/// Mutations take the write lock, so concurrent callers cannot break the
/// pairing. Entries never expire; callers remove them when they delete or
/// rename resources.
#[derive(Debug, Default)]
pub struct PathCache {
    maps: RwLock<Maps>,
    snapshot_path: Option<PathBuf>,
}

impl PathCache {
    /// An empty in-memory cache with no snapshot location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `snapshot_path`, starting empty if it is absent or corrupt.
    pub async fn load(snapshot_path: impl AsRef<Path>) -> Self {
        let snapshot_path = snapshot_path.as_ref().to_path_buf();
        let maps = match read_snapshot(&snapshot_path).await {
            Some(snapshot) => Maps::from_snapshot(snapshot),
            None => Maps::default(),
        };
        info!(
            path = %snapshot_path.display(),
            entries = maps.id_to_path.len(),
            "Path cache loaded"
        );
        Self {
            maps: RwLock::new(maps),
            snapshot_path: Some(snapshot_path),
        }
    }

    /// Build the cache described by configuration.
    pub async fn from_config(config: &PathCacheConfig) -> Self {
        if config.persist {
            Self::load(&config.snapshot_path).await
        } else {
            Self::new()
        }
    }

    /// Id cached for `path`.
    pub async fn get_id(&self, path: &str) -> Option<String> {
        let key = normalize_path(path);
        let id = self.maps.read().await.path_to_id.get(&key).cloned();
        debug!(path = %key, hit = id.is_some(), "Path cache lookup");
        id
    }

    /// Normalized path cached for `id`.
    pub async fn get_path(&self, id: &str) -> Option<String> {
        self.maps.read().await.id_to_path.get(id).cloned()
    }

    /// Store `id <-> path`, replacing any mapping either key had.
    pub async fn add(&self, id: &str, path: &str) {
        let key = normalize_path(path);
        debug!(id = %id, path = %key, "Path cache add");
        self.maps.write().await.insert(id, key);
    }

    /// Remove the mapping for `id`; returns the path it had.
    pub async fn delete_by_id(&self, id: &str) -> Option<String> {
        self.maps.write().await.remove_id(id)
    }

    /// Remove the mapping for `path`; returns the id it had.
    pub async fn delete_by_path(&self, path: &str) -> Option<String> {
        let key = normalize_path(path);
        self.maps.write().await.remove_path(&key)
    }

    /// Remove `path` and every cached path below it; returns how many went.
    pub async fn delete_subtree(&self, path: &str) -> usize {
        let prefix = normalize_path(path);
        if prefix.is_empty() {
            return 0;
        }
        let mut maps = self.maps.write().await;
        let doomed: Vec<String> = maps
            .path_to_id
            .keys()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect();
        for p in &doomed {
            maps.remove_path(p);
        }
        debug!(path = %prefix, removed = doomed.len(), "Path cache subtree removed");
        doomed.len()
    }

    /// Number of cached mappings.
    pub async fn len(&self) -> usize {
        self.maps.read().await.id_to_path.len()
    }

    /// Whether the cache holds no mappings.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop every mapping.
    pub async fn clear(&self) {
        let mut maps = self.maps.write().await;
        maps.id_to_path.clear();
        maps.path_to_id.clear();
    }

    /// Snapshot location, if the cache persists.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Write both maps to the snapshot location.
    pub async fn store(&self) -> AppResult<()> {
        let path = self
            .snapshot_path
            .as_deref()
            .ok_or_else(|| AppError::configuration("Path cache has no snapshot location"))?;
        let snapshot = self.maps.read().await.to_snapshot();
        write_snapshot(path, &snapshot).await?;
        info!(path = %path.display(), entries = snapshot.0.len(), "Path cache stored");
        Ok(())
    }
}
