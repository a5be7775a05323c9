//! Test helpers for mblog-pin integration tests
//!
//! `FakePinata` is a real HTTP server bound to an ephemeral localhost port
//! that speaks the v3 file upload API and records every upload.

#![allow(dead_code)]

use axum::{
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use mblog_pin::services::PinataClient;
use mblog_pin::{build_router, AppState};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_JWT: &str = "test-jwt";
pub const TEST_GATEWAY: &str = "gw.test";

/// One upload received by the fake service
#[derive(Debug, Clone)]
pub struct PinRecord {
    pub name: Option<String>,
    pub network: Option<String>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Default)]
struct FakeState {
    records: Arc<Mutex<Vec<PinRecord>>>,
    fail: Arc<AtomicBool>,
}

/// Fake pinning service
pub struct FakePinata {
    pub addr: SocketAddr,
    state: FakeState,
}

impl FakePinata {
    pub async fn start() -> Self {
        let state = FakeState::default();
        let app = Router::new()
            .route("/v3/files", post(fake_upload))
            .with_state(state.clone());

        let addr = serve(app).await;
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make every following upload answer 500
    pub fn fail_uploads(&self) {
        self.state.fail.store(true, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<PinRecord> {
        self.state.records.lock().unwrap().clone()
    }
}

async fn fake_upload(
    State(state): State<FakeState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TEST_JWT))
        .unwrap_or(false);
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad jwt"})));
    }

    if state.fail.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "storage offline"})),
        );
    }

    let mut record = PinRecord {
        name: None,
        network: None,
        file_name: None,
        mime_type: None,
        bytes: Vec::new(),
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "file" => {
                record.file_name = field.file_name().map(str::to_string);
                record.mime_type = field.content_type().map(str::to_string);
                record.bytes = field.bytes().await.unwrap_or_default().to_vec();
            }
            "name" => record.name = field.text().await.ok(),
            "network" => record.network = field.text().await.ok(),
            _ => {}
        }
    }

    let mut records = state.records.lock().unwrap();
    let cid = format!("bafyfake{}", records.len());
    records.push(record);

    (
        StatusCode::OK,
        Json(json!({
            "data": {
                "id": format!("file-{}", cid),
                "cid": cid,
                "network": "public"
            }
        })),
    )
}

/// Serve a router on an ephemeral localhost port
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Gateway app pointed at the fake service
pub fn gateway_app(pinata_url: &str, jwt: &str, max_upload_bytes: usize) -> (axum::Router, AppState) {
    let client = PinataClient::new(jwt.to_string(), pinata_url.to_string(), TEST_GATEWAY.to_string())
        .expect("client");
    let state = AppState::new(client, max_upload_bytes);
    (build_router(state.clone()), state)
}

/// Minimal PNG header, enough for magic-byte detection
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01,
    ]
}
