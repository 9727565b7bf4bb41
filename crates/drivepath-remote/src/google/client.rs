//! The Drive v3 HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::{Body, Method, RequestBuilder, Response};
use tracing::{debug, info};

use drivepath_core::config::RemoteConfig;
use drivepath_core::error::AppError;
use drivepath_core::result::AppResult;
use drivepath_core::traits::{ByteStream, RemoteDrive};
use drivepath_core::types::{FilePage, RemoteResource, ResourceMetadata, TransferCallbacks};

use super::dto::{DriveFile, DriveFileBody, DriveFileList, FILE_FIELDS, list_fields};
use super::multipart;
use super::status::{status_error, transport_error};
use crate::auth::{StaticToken, TokenProvider};

/// Async client for the Drive v3 REST API.
#[derive(Debug, Clone)]
pub struct GoogleDriveClient {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    page_size: u32,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleDriveClient {
    /// Create a client with an explicit token source.
    pub fn new(config: &RemoteConfig, tokens: Arc<dyn TokenProvider>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    drivepath_core::ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        Ok(Self {
            http,
            api_base: config.api_base_url.trim_end_matches('/').to_string(),
            upload_base: config.upload_base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            tokens,
        })
    }

    /// Create a client using the token in configuration.
    pub fn from_config(config: &RemoteConfig) -> AppResult<Self> {
        let tokens = Arc::new(StaticToken::new(config.access_token.clone()));
        Self::new(config, tokens)
    }

    fn files_url(&self, suffix: &str) -> String {
        format!("{}/files{suffix}", self.api_base)
    }

    fn upload_url(&self, suffix: &str) -> String {
        format!("{}/files{suffix}", self.upload_base)
    }

    async fn request(&self, method: Method, url: &str) -> AppResult<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn send_file(&self, builder: RequestBuilder) -> AppResult<RemoteResource> {
        let file: DriveFile = self
            .send(builder)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(file.into())
    }

    async fn upload(
        &self,
        method: Method,
        url: &str,
        body: &DriveFileBody,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let json = serde_json::to_vec(body)?;
        let part = multipart::related(&json, &content, content_type);
        let stream = multipart::progress_stream(part.body.clone(), callbacks.clone());

        let builder = self
            .request(method, url)
            .await?
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(reqwest::header::CONTENT_TYPE, part.content_type.as_str())
            .header(reqwest::header::CONTENT_LENGTH, part.body.len())
            .body(Body::wrap_stream(stream));
        self.send_file(builder).await
    }

    fn into_byte_stream(response: Response) -> ByteStream {
        Box::pin(response.bytes_stream().map_err(std::io::Error::other))
    }
}

#[async_trait]
impl RemoteDrive for GoogleDriveClient {
    async fn get(&self, id: &str) -> AppResult<RemoteResource> {
        debug!(id = %id, "files.get");
        let builder = self
            .request(Method::GET, &self.files_url(&format!("/{id}")))
            .await?
            .query(&[("fields", FILE_FIELDS)]);
        self.send_file(builder).await
    }

    async fn list(&self, query: &str, page_token: Option<&str>) -> AppResult<FilePage> {
        debug!(query = %query, page_token = ?page_token, "files.list");
        let fields = list_fields();
        let page_size = self.page_size.to_string();
        let mut params = vec![
            ("q", query),
            ("fields", fields.as_str()),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let builder = self
            .request(Method::GET, &self.files_url(""))
            .await?
            .query(&params);
        let list: DriveFileList = self
            .send(builder)
            .await?
            .json()
            .await
            .map_err(transport_error)?;

        Ok(FilePage {
            resources: list.files.into_iter().map(RemoteResource::from).collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    async fn create(&self, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        let builder = self
            .request(Method::POST, &self.files_url(""))
            .await?
            .query(&[("fields", FILE_FIELDS)])
            .json(&DriveFileBody::for_create(metadata));
        let created = self.send_file(builder).await?;
        info!(id = %created.id, name = %created.name, "files.create");
        Ok(created)
    }

    async fn create_with_content(
        &self,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        let size = content.len();
        let created = self
            .upload(
                Method::POST,
                &self.upload_url(""),
                &DriveFileBody::for_create(metadata),
                content,
                content_type,
                callbacks,
            )
            .await?;
        info!(id = %created.id, name = %created.name, size, "files.create (upload)");
        Ok(created)
    }

    async fn update(&self, id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        let builder = self
            .request(Method::PATCH, &self.files_url(&format!("/{id}")))
            .await?
            .query(&[("fields", FILE_FIELDS)])
            .json(&DriveFileBody::for_update(metadata));
        self.send_file(builder).await
    }

    async fn update_with_content(
        &self,
        id: &str,
        metadata: &ResourceMetadata,
        content: Bytes,
        content_type: &str,
        callbacks: &TransferCallbacks,
    ) -> AppResult<RemoteResource> {
        self.upload(
            Method::PATCH,
            &self.upload_url(&format!("/{id}")),
            &DriveFileBody::for_update(metadata),
            content,
            content_type,
            callbacks,
        )
        .await
    }

    async fn copy(&self, source_id: &str, metadata: &ResourceMetadata) -> AppResult<RemoteResource> {
        let builder = self
            .request(Method::POST, &self.files_url(&format!("/{source_id}/copy")))
            .await?
            .query(&[("fields", FILE_FIELDS)])
            .json(&DriveFileBody::for_create(metadata));
        let copied = self.send_file(builder).await?;
        info!(source = %source_id, id = %copied.id, "files.copy");
        Ok(copied)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let builder = self
            .request(Method::DELETE, &self.files_url(&format!("/{id}")))
            .await?;
        self.send(builder).await?;
        info!(id = %id, "files.delete");
        Ok(())
    }

    async fn download(&self, id: &str) -> AppResult<ByteStream> {
        let builder = self
            .request(Method::GET, &self.files_url(&format!("/{id}")))
            .await?
            .query(&[("alt", "media")]);
        let response = self.send(builder).await?;
        Ok(Self::into_byte_stream(response))
    }

    async fn export(&self, id: &str, mime_type: &str) -> AppResult<ByteStream> {
        let builder = self
            .request(Method::GET, &self.files_url(&format!("/{id}/export")))
            .await?
            .query(&[("mimeType", mime_type)]);
        let response = self.send(builder).await?;
        Ok(Self::into_byte_stream(response))
    }
}
