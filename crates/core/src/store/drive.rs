use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::errors::CoreError;

use super::traits::{DocumentStore, RemoteFile};

const BASE_URL: &str = "https://www.googleapis.com";
const JSON_MIME: &str = "application/json; charset=utf-8";

/// Thin typed wrapper over the remote file API's app-private space.
///
/// Knows the wire protocol — multipart uploads, `If-Match` preconditions,
/// version tags in response headers — and nothing about portfolios.
pub struct DriveClient {
    client: Client,
    base_url: String,
}

impl DriveClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn create_metadata(name: &str) -> String {
        json!({"name": name, "parents": ["appDataFolder"], "mimeType": "application/json"})
            .to_string()
    }

    fn update_metadata() -> String {
        json!({"mimeType": "application/json"}).to_string()
    }

    fn multipart_body(metadata: String, content: &str) -> Result<Form, CoreError> {
        let form = Form::new()
            .part("metadata", Part::text(metadata).mime_str(JSON_MIME)?)
            .part("media", Part::text(content.to_string()).mime_str(JSON_MIME)?);
        Ok(form)
    }
}

impl Default for DriveClient {
    fn default() -> Self {
        Self::new()
    }
}

// ── Wire response types ─────────────────────────────────────────────

#[derive(Deserialize)]
struct FileListResponse {
    #[serde(default)]
    files: Vec<FileResource>,
}

#[derive(Deserialize)]
struct FileResource {
    id: Option<String>,
    name: Option<String>,
}

#[async_trait]
impl DocumentStore for DriveClient {
    async fn list(&self, token: &str, name_equals: &str) -> Result<Vec<RemoteFile>, CoreError> {
        let url = format!("{}/drive/v3/files", self.base_url);
        let query = format!("name = '{name_equals}'");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("spaces", "appDataFolder"),
                ("q", query.as_str()),
                ("fields", "files(id,name,modifiedTime)"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Store {
                endpoint: "list".into(),
                status: resp.status().as_u16(),
            });
        }

        let listing: FileListResponse = resp.json().await?;
        Ok(listing
            .files
            .into_iter()
            .filter_map(|f| {
                Some(RemoteFile {
                    id: f.id?,
                    name: f.name.unwrap_or_default(),
                })
            })
            .collect())
    }

    async fn version_tag(&self, token: &str, file_id: &str) -> Result<Option<String>, CoreError> {
        let url = format!("{}/drive/v3/files/{file_id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("fields", "id,name,modifiedTime")])
            .send()
            .await?;

        if !resp.status().is_success() {
            debug!(status = resp.status().as_u16(), "metadata read rejected; no version tag");
            return Ok(None);
        }

        // Header lookup is case-insensitive, so ETag/Etag/etag all match.
        let tag = resp
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(tag)
    }

    async fn download(&self, token: &str, file_id: &str) -> Result<String, CoreError> {
        let url = format!("{}/drive/v3/files/{file_id}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Store {
                endpoint: "download".into(),
                status: resp.status().as_u16(),
            });
        }

        Ok(resp.text().await?)
    }

    async fn create(
        &self,
        token: &str,
        name: &str,
        content: &str,
    ) -> Result<RemoteFile, CoreError> {
        let url = format!("{}/upload/drive/v3/files", self.base_url);
        let form = Self::multipart_body(Self::create_metadata(name), content)?;

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("uploadType", "multipart")])
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Store {
                endpoint: "create".into(),
                status: resp.status().as_u16(),
            });
        }

        let created: FileResource = resp.json().await?;
        let id = created.id.ok_or_else(|| {
            CoreError::Deserialization("create response carried no file id".into())
        })?;
        debug!(%id, "created remote document");
        Ok(RemoteFile {
            id,
            name: created.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn update(
        &self,
        token: &str,
        file_id: &str,
        precondition: Option<&str>,
        content: &str,
    ) -> Result<RemoteFile, CoreError> {
        let url = format!("{}/upload/drive/v3/files/{file_id}", self.base_url);
        let form = Self::multipart_body(Self::update_metadata(), content)?;

        let mut req = self
            .client
            .patch(&url)
            .bearer_auth(token)
            .query(&[("uploadType", "multipart")])
            .multipart(form);
        if let Some(tag) = precondition {
            req = req.header("If-Match", tag);
        }

        let resp = req.send().await?;

        if resp.status() == StatusCode::PRECONDITION_FAILED {
            return Err(CoreError::VersionConflict);
        }
        if !resp.status().is_success() {
            return Err(CoreError::Store {
                endpoint: "update".into(),
                status: resp.status().as_u16(),
            });
        }

        let updated: FileResource = resp.json().await?;
        Ok(RemoteFile {
            // Some store responses omit the id on update; fall back to the
            // id we addressed.
            id: updated.id.unwrap_or_else(|| file_id.to_string()),
            name: updated.name.unwrap_or_default(),
        })
    }
}
