//! Pinning service client
//!
//! Uploads files and JSON documents to the pinning service's v3 file API and
//! resolves the returned CIDs to gateway URLs. The JWT never leaves this
//! process. Every call is a single attempt: no retry, no local deduplication.

use mblog_common::cid;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PINATA_API_URL: &str = "https://uploads.pinata.cloud";
pub const DEFAULT_GATEWAY: &str = "gateway.pinata.cloud";
const USER_AGENT: &str = concat!("mblog-pin/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Pinning client errors
#[derive(Debug, Error)]
pub enum PinError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Pinning service rejected credentials ({0})")]
    Unauthorized(u16),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// v3 upload response envelope
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinataUploadResponse {
    pub data: PinataFile,
}

/// Uploaded file record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinataFile {
    pub id: Option<String>,
    pub name: Option<String>,
    pub cid: String,
    pub size: Option<u64>,
    pub mime_type: Option<String>,
    pub network: Option<String>,
}

/// Pinning service API client
pub struct PinataClient {
    http_client: reqwest::Client,
    api_url: String,
    jwt: String,
    gateway: String,
}

impl PinataClient {
    pub fn new(jwt: String, api_url: String, gateway: String) -> Result<Self, PinError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PinError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            jwt,
            gateway,
        })
    }

    /// Pin raw bytes as a public file, returning its CID
    pub async fn pin_file(
        &self,
        bytes: Vec<u8>,
        name: &str,
        mime_type: &str,
    ) -> Result<String, PinError> {
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| PinError::ParseError(format!("Invalid mime type {}: {}", mime_type, e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("network", "public")
            .text("name", name.to_string());

        tracing::debug!(name, size, mime_type, "Pinning file");

        let response = self
            .http_client
            .post(format!("{}/v3/files", self.api_url))
            .bearer_auth(&self.jwt)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PinError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(PinError::Unauthorized(status.as_u16()));
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PinError::ApiError(status.as_u16(), error_text));
        }

        let upload: PinataUploadResponse = response
            .json()
            .await
            .map_err(|e| PinError::ParseError(e.to_string()))?;

        if upload.data.cid.trim().is_empty() {
            return Err(PinError::ParseError("Response carried an empty CID".to_string()));
        }

        tracing::info!(cid = %upload.data.cid, name, size, "File pinned");

        Ok(upload.data.cid)
    }

    /// Pin a JSON document, returning its CID
    pub async fn pin_json(&self, document: &serde_json::Value, name: &str) -> Result<String, PinError> {
        let bytes = serde_json::to_vec(document).map_err(|e| PinError::ParseError(e.to_string()))?;
        let file_name = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{}.json", name)
        };
        self.pin_file(bytes, &file_name, "application/json").await
    }

    /// Resolve a CID through the configured gateway
    pub fn gateway_url(&self, cid: &str) -> String {
        cid::gateway_url(&self.gateway, cid)
    }
}
