//! Remote API configuration.

use serde::{Deserialize, Serialize};

/// Settings for the Drive REST client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL for metadata requests.
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
    /// Base URL for media uploads.
    #[serde(default = "default_upload_base")]
    pub upload_base_url: String,
    /// OAuth bearer token. Obtaining it is outside this library.
    #[serde(default)]
    pub access_token: Option<String>,
    /// Number of resources requested per listing page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base(),
            upload_base_url: default_upload_base(),
            access_token: None,
            page_size: default_page_size(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_upload_base() -> String {
    "https://www.googleapis.com/upload/drive/v3".to_string()
}

fn default_page_size() -> u32 {
    1000
}

fn default_request_timeout() -> u64 {
    60
}
