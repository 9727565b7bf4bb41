//! Wire types for the Drive v3 `files` resource.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use drivepath_core::types::{RemoteResource, ResourceKind, ResourceMetadata};

/// Fields requested for every file.
pub const FILE_FIELDS: &str =
    "id,name,mimeType,parents,size,trashed,properties,owners(emailAddress),createdTime";

/// Fields requested for a listing page.
pub fn list_fields() -> String {
    format!("nextPageToken,files({FILE_FIELDS})")
}

/// An owner entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveUser {
    /// Owner's email address.
    pub email_address: Option<String>,
}

/// A file as returned by the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub parents: Vec<String>,
    /// Decimal string; absent for folders and native documents.
    pub size: Option<String>,
    #[serde(default)]
    pub trashed: bool,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub owners: Vec<DriveUser>,
    pub created_time: Option<DateTime<Utc>>,
}

impl From<DriveFile> for RemoteResource {
    fn from(file: DriveFile) -> Self {
        let kind = ResourceKind::from_mime_type(&file.mime_type);
        let size = if kind.is_folder() {
            None
        } else {
            file.size.as_deref().and_then(|s| s.parse().ok())
        };
        Self {
            id: file.id,
            name: file.name,
            parent_id: file.parents.into_iter().next(),
            kind,
            mime_type: file.mime_type,
            size,
            is_trashed: file.trashed,
            properties: file.properties,
            owners: file
                .owners
                .into_iter()
                .filter_map(|o| o.email_address)
                .collect(),
            created_time: file.created_time,
            cached_full_name: None,
        }
    }
}

/// A listing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
    pub next_page_token: Option<String>,
}

/// Request body for create, update and copy.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFileBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
}

impl DriveFileBody {
    /// Body for a create or copy: parents are set.
    pub fn for_create(metadata: &ResourceMetadata) -> Self {
        Self {
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
            parents: metadata.parent_id.clone().map(|p| vec![p]),
            properties: metadata.properties.clone(),
        }
    }

    /// Body for an update: parents are moved through query parameters instead.
    pub fn for_update(metadata: &ResourceMetadata) -> Self {
        Self {
            parents: None,
            ..Self::for_create(metadata)
        }
    }
}
