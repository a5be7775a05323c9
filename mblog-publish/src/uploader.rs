//! Content Uploader
//!
//! Sends cover images and article documents to the pinning gateway
//! (`mblog-pin`), which holds the storage credential. Each upload is a single
//! attempt; once the gateway accepts an object it is permanent.

use async_trait::async_trait;
use mblog_common::{cid, time, UploadResult};
use serde_json::Value;
use std::time::Duration;

use crate::error::UploadError;

const USER_AGENT: &str = concat!("mblog/", env!("CARGO_PKG_VERSION"));

/// Default gateway address, matching `mblog-pin`'s default bind
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5780";

/// Uploads to content-addressed storage
#[async_trait]
pub trait ContentUploader: Send + Sync {
    /// Upload a binary file
    async fn upload_file(&self, bytes: Vec<u8>) -> Result<UploadResult, UploadError>;

    /// Upload a JSON document
    async fn upload_json(&self, document: &Value) -> Result<UploadResult, UploadError>;
}

/// Uploader that goes through the pinning gateway
pub struct GatewayUploader {
    http_client: reqwest::Client,
    base_url: String,
}

impl GatewayUploader {
    pub fn new(base_url: &str) -> Result<Self, UploadError> {
        // No request timeout: slow uploads are left to the transport
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn read_response(response: reqwest::Response) -> Result<UploadResult, UploadError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        parse_upload_response(&body)
    }
}

#[async_trait]
impl ContentUploader for GatewayUploader {
    async fn upload_file(&self, bytes: Vec<u8>) -> Result<UploadResult, UploadError> {
        let (mime_type, extension) = infer::get(&bytes)
            .map(|kind| (kind.mime_type(), kind.extension()))
            .unwrap_or(("application/octet-stream", "bin"));
        let size = bytes.len();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(format!("cover.{}", extension))
            .mime_str(mime_type)
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("name", format!("mini-blog-cover-{}", time::unix_millis(time::now())));

        tracing::debug!(size, mime_type, "Uploading file");

        let response = self
            .http_client
            .post(format!("{}/api/files", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Self::read_response(response).await
    }

    async fn upload_json(&self, document: &Value) -> Result<UploadResult, UploadError> {
        let name = format!("mini-blog-article-{}", time::unix_millis(time::now()));

        tracing::debug!(name = %name, "Uploading JSON document");

        let response = self
            .http_client
            .post(format!("{}/api/json", self.base_url))
            .query(&[("name", name.as_str())])
            .json(document)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Self::read_response(response).await
    }
}

/// Parse a gateway response body
///
/// Accepts the structured `{contentId, gatewayUrl}` object, or a bare URL
/// (JSON string or plain text) as returned by older gateways.
pub fn parse_upload_response(body: &str) -> Result<UploadResult, UploadError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(UploadError::InvalidResponse("Empty response".to_string()));
    }

    if let Ok(result) = serde_json::from_str::<UploadResult>(body) {
        return Ok(result);
    }

    let url = match serde_json::from_str::<Value>(body) {
        Ok(Value::String(url)) => url,
        Ok(Value::Object(map)) => match map.get("url").and_then(Value::as_str) {
            Some(url) => url.to_string(),
            None => return Err(UploadError::InvalidResponse(body.to_string())),
        },
        Ok(_) => return Err(UploadError::InvalidResponse(body.to_string())),
        Err(_) => body.to_string(),
    };

    let content_id = cid::extract_content_id(&url)
        .ok_or_else(|| UploadError::InvalidResponse(format!("No content id in {}", url)))?;

    Ok(UploadResult {
        content_id,
        gateway_url: url,
    })
}

/// Pull a human-readable message out of an error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
