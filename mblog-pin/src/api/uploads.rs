//! Upload endpoints
//!
//! - `POST /api/files`: multipart form with a `file` field (and optional `name`)
//! - `POST /api/json`: JSON object body, pinned as `{name}.json`
//!
//! Both answer `{"contentId": ..., "gatewayUrl": ...}`.

use axum::{
    extract::{Multipart, Query, State},
    routing::post,
    Json, Router,
};
use mblog_common::{time, UploadResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{ApiError, ApiResult, AppState};

/// Optional pin name for JSON uploads
#[derive(Debug, Default, Deserialize)]
pub struct PinNameQuery {
    pub name: Option<String>,
}

fn default_pin_name(kind: &str) -> String {
    format!("mini-blog-{}-{}", kind, time::unix_millis(time::now()))
}

fn sanitize_name(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.chars().filter(|c| !c.is_control()).take(255).collect())
    }
}

/// POST /api/files
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResult>> {
    let mut file: Option<(Vec<u8>, Option<String>, Option<String>)> = None;
    let mut pin_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
                file = Some((bytes.to_vec(), file_name, content_type));
            }
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read name: {}", e)))?;
                pin_name = sanitize_name(&text);
            }
            _ => {}
        }
    }

    let (bytes, file_name, content_type) =
        file.ok_or_else(|| ApiError::BadRequest("No file provided".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let mime_type = content_type
        .filter(|m| !m.is_empty() && m != "application/octet-stream")
        .or_else(|| infer::get(&bytes).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let name = pin_name
        .or_else(|| file_name.as_deref().and_then(sanitize_name))
        .unwrap_or_else(|| default_pin_name("cover"));

    let cid = match state.pinata.pin_file(bytes, &name, &mime_type).await {
        Ok(cid) => cid,
        Err(e) => {
            warn!(name = %name, error = %e, "File pin failed");
            state.record_error(e.to_string()).await;
            return Err(e.into());
        }
    };

    let gateway_url = state.pinata.gateway_url(&cid);
    info!(cid = %cid, name = %name, "File upload complete");

    Ok(Json(UploadResult {
        content_id: cid,
        gateway_url,
    }))
}

/// POST /api/json
pub async fn upload_json(
    State(state): State<AppState>,
    Query(query): Query<PinNameQuery>,
    Json(document): Json<Value>,
) -> ApiResult<Json<UploadResult>> {
    if !document.is_object() {
        return Err(ApiError::BadRequest(
            "JSON upload must be an object".to_string(),
        ));
    }

    let name = query
        .name
        .as_deref()
        .and_then(sanitize_name)
        .unwrap_or_else(|| default_pin_name("article"));

    let cid = match state.pinata.pin_json(&document, &name).await {
        Ok(cid) => cid,
        Err(e) => {
            warn!(name = %name, error = %e, "JSON pin failed");
            state.record_error(e.to_string()).await;
            return Err(e.into());
        }
    };

    let gateway_url = state.pinata.gateway_url(&cid);
    info!(cid = %cid, name = %name, "JSON upload complete");

    Ok(Json(UploadResult {
        content_id: cid,
        gateway_url,
    }))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/files", post(upload_file))
        .route("/api/json", post(upload_json))
}
