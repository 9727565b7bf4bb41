//! JSON snapshot of the cache maps.
//!
//! The file holds a two-element array: `[id_to_path, path_to_id]`.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use drivepath_core::result::AppResult;

/// Serialized form of both cache directions.
pub type Snapshot = (HashMap<String, String>, HashMap<String, String>);

/// Read a snapshot; a missing or unreadable file yields `None`.
pub async fn read_snapshot(path: &Path) -> Option<Snapshot> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No path cache snapshot, starting empty");
            return None;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read path cache snapshot");
            return None;
        }
    };

    match serde_json::from_slice::<Snapshot>(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt path cache snapshot, starting empty");
            None
        }
    }
}

/// Write a snapshot through a temporary file and an atomic rename.
pub async fn write_snapshot(path: &Path, snapshot: &Snapshot) -> AppResult<()> {
    let json = serde_json::to_vec(snapshot)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
