//! Remote resource model.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::ResourceKind;

/// Alias the remote API accepts for the caller's root folder.
pub const ROOT_ID: &str = "root";

/// One remote file or folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResource {
    /// Remote-assigned stable identifier.
    pub id: String,
    /// Display name; not unique within a parent.
    pub name: String,
    /// Parent folder id (`None` for resources without a parent link).
    pub parent_id: Option<String>,
    /// Resolved kind.
    pub kind: ResourceKind,
    /// MIME string as reported by the remote API.
    pub mime_type: String,
    /// Size in bytes; never set for folders.
    pub size: Option<u64>,
    /// Whether the resource is in the trash.
    pub is_trashed: bool,
    /// Caller-defined key/value metadata.
    #[serde(default)]
    pub properties: HashMap<String, String>,
    /// Email addresses of the owners.
    #[serde(default)]
    pub owners: Vec<String>,
    /// Creation time, when the remote API reports it.
    pub created_time: Option<DateTime<Utc>>,
    /// Memoized full path, filled in by full-name resolution.
    #[serde(skip)]
    pub cached_full_name: Option<String>,
}

impl RemoteResource {
    /// Build a resource of the given kind with its canonical MIME string.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ResourceKind,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id,
            kind,
            mime_type: kind.mime_type().to_string(),
            size: None,
            is_trashed: false,
            properties: HashMap::new(),
            owners: Vec::new(),
            created_time: None,
            cached_full_name: None,
        }
    }

    /// Whether this resource is a folder.
    pub fn is_folder(&self) -> bool {
        self.kind.is_folder()
    }

    /// Whether this resource is a root-level resource.
    pub fn is_root_level(&self) -> bool {
        match self.parent_id.as_deref() {
            None => true,
            Some(parent) => parent == ROOT_ID,
        }
    }

    /// Metadata describing this resource's mutable fields.
    pub fn to_metadata(&self) -> ResourceMetadata {
        ResourceMetadata {
            name: Some(self.name.clone()),
            mime_type: None,
            parent_id: None,
            properties: self.properties.clone(),
        }
    }
}

/// Metadata sent on create, update and copy.
///
/// Unset fields are left untouched by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Resource name.
    pub name: Option<String>,
    /// MIME string of the resource.
    pub mime_type: Option<String>,
    /// Parent folder id.
    pub parent_id: Option<String>,
    /// Caller-defined properties.
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl ResourceMetadata {
    /// Metadata for a new folder.
    pub fn folder(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Self {
            name: Some(name.into()),
            mime_type: Some(ResourceKind::Folder.mime_type().to_string()),
            parent_id,
            properties: HashMap::new(),
        }
    }

    /// Metadata for a new file.
    pub fn file(
        name: impl Into<String>,
        parent_id: Option<String>,
        properties: HashMap<String, String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            mime_type: None,
            parent_id,
            properties,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct FilePage {
    /// Resources on this page.
    pub resources: Vec<RemoteResource>,
    /// Token for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_level() {
        let at_root = RemoteResource::new("1", "a", ResourceKind::PlainText, Some(ROOT_ID.into()));
        let orphan = RemoteResource::new("2", "b", ResourceKind::PlainText, None);
        let nested = RemoteResource::new("3", "c", ResourceKind::PlainText, Some("folder".into()));
        assert!(at_root.is_root_level());
        assert!(orphan.is_root_level());
        assert!(!nested.is_root_level());
    }

    #[test]
    fn test_folder_metadata_carries_mime() {
        let meta = ResourceMetadata::folder("docs", None);
        assert_eq!(
            meta.mime_type.as_deref(),
            Some("application/vnd.google-apps.folder")
        );
    }
}
