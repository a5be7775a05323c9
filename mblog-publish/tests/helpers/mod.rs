//! Test helpers for mblog-publish integration tests
//!
//! In-process fakes for the uploader, wallet and contract seams, plus real
//! HTTP servers on ephemeral localhost ports standing in for the pinning
//! gateway and a JSON-RPC wallet.

#![allow(dead_code)]

use alloy_primitives::U256;
use async_trait::async_trait;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use mblog_common::config::NetworkConfig;
use mblog_common::UploadResult;
use mblog_publish::chain::{ArticleContract, MintOutcome, WalletProvider};
use mblog_publish::{BlockchainError, UploadError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const CID_A: &str = "bafycoverimagecid";
pub const CID_B: &str = "bafyarticledocumentcid";
pub const GATEWAY: &str = "https://gw.test/ipfs";
pub const AUTHOR: &str = "0x1111111111111111111111111111111111111111";
pub const TARGET_CHAIN: &str = "0xa045c";
pub const OTHER_CHAIN: &str = "0x1";

/// Minimal PNG header, enough for magic-byte detection
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01,
    ]
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

// =============================================================================
// Uploader
// =============================================================================

/// Uploader returning `CID_A` for files and `CID_B` for documents
#[derive(Clone, Default)]
pub struct FakeUploader {
    pub fail_file: Arc<AtomicBool>,
    pub fail_json: Arc<AtomicBool>,
    /// Gateway URL reported for documents instead of `GATEWAY/CID_B`
    pub document_url: Arc<Mutex<Option<String>>>,
    pub files: Arc<Mutex<Vec<Vec<u8>>>>,
    pub documents: Arc<Mutex<Vec<Value>>>,
}

impl FakeUploader {
    pub fn failing_cover() -> Self {
        let uploader = Self::default();
        uploader.fail_file.store(true, Ordering::SeqCst);
        uploader
    }

    pub fn failing_document() -> Self {
        let uploader = Self::default();
        uploader.fail_json.store(true, Ordering::SeqCst);
        uploader
    }

    /// Report documents under a subdomain gateway, which has no CID in its path
    pub fn subdomain_gateway() -> Self {
        let uploader = Self::default();
        *uploader.document_url.lock().unwrap() =
            Some(format!("https://{}.ipfs.dweb.link/", CID_B));
        uploader
    }

    pub fn documents(&self) -> Vec<Value> {
        self.documents.lock().unwrap().clone()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }
}

#[async_trait]
impl mblog_publish::ContentUploader for FakeUploader {
    async fn upload_file(&self, bytes: Vec<u8>) -> Result<UploadResult, UploadError> {
        self.files.lock().unwrap().push(bytes);
        if self.fail_file.load(Ordering::SeqCst) {
            return Err(UploadError::Network("connection reset".to_string()));
        }
        Ok(UploadResult {
            content_id: CID_A.to_string(),
            gateway_url: format!("{}/{}", GATEWAY, CID_A),
        })
    }

    async fn upload_json(&self, document: &Value) -> Result<UploadResult, UploadError> {
        self.documents.lock().unwrap().push(document.clone());
        if self.fail_json.load(Ordering::SeqCst) {
            return Err(UploadError::Rejected {
                status: 502,
                message: "storage offline".to_string(),
            });
        }
        let gateway_url = self
            .document_url
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| format!("{}/{}", GATEWAY, CID_B));
        Ok(UploadResult {
            content_id: CID_B.to_string(),
            gateway_url,
        })
    }
}

// =============================================================================
// Wallet and contract
// =============================================================================

/// In-memory wallet; knows only the chains in `known_chains`
pub struct FakeWallet {
    pub accounts: Mutex<Vec<String>>,
    pub chain: Mutex<String>,
    pub known_chains: Mutex<Vec<String>>,
    pub reject_requests: AtomicBool,
    pub added: Mutex<Vec<NetworkConfig>>,
    pub balance: U256,
    events: broadcast::Sender<String>,
}

impl FakeWallet {
    pub fn on_chain(chain: &str) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Mutex::new(vec![AUTHOR.to_string()]),
            chain: Mutex::new(chain.to_string()),
            known_chains: Mutex::new(vec![OTHER_CHAIN.to_string()]),
            reject_requests: AtomicBool::new(false),
            added: Mutex::new(Vec::new()),
            balance: U256::from(2_500_000_000_000_000_000u64),
            events,
        }
    }

    pub fn knowing(self, chain: &str) -> Self {
        self.known_chains.lock().unwrap().push(chain.to_string());
        self
    }

    /// Simulate the user switching chain in the wallet UI
    pub fn user_switches_to(&self, chain: &str) {
        *self.chain.lock().unwrap() = chain.to_string();
        let _ = self.events.send(chain.to_string());
    }

    fn check_rejected(&self) -> Result<(), BlockchainError> {
        if self.reject_requests.load(Ordering::SeqCst) {
            Err(BlockchainError::UserRejected)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, BlockchainError> {
        self.check_rejected()?;
        Ok(self.accounts.lock().unwrap().clone())
    }

    async fn chain_id(&self) -> Result<String, BlockchainError> {
        Ok(self.chain.lock().unwrap().clone())
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), BlockchainError> {
        self.check_rejected()?;
        let known = self
            .known_chains
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(chain_id));
        if !known {
            return Err(BlockchainError::UnknownChain(chain_id.to_string()));
        }
        self.user_switches_to(chain_id);
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), BlockchainError> {
        self.check_rejected()?;
        self.known_chains.lock().unwrap().push(network.chain_id.clone());
        self.added.lock().unwrap().push(network.clone());
        Ok(())
    }

    fn subscribe_chain_changes(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }

    async fn balance(&self, _address: &str) -> Result<U256, BlockchainError> {
        Ok(self.balance)
    }
}

/// Contract double answering with a fixed token id or error
pub struct FakeContract {
    calls: Mutex<Vec<(String, String)>>,
    token_id: Option<String>,
    error: Option<fn() -> BlockchainError>,
}

impl FakeContract {
    pub fn minting(token_id: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            token_id: Some(token_id.to_string()),
            error: None,
        }
    }

    pub fn failing(error: fn() -> BlockchainError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            token_id: None,
            error: Some(error),
        }
    }

    /// (from, content id) of every mint call
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArticleContract for FakeContract {
    async fn mint_article(&self, from: &str, content_id: &str) -> Result<MintOutcome, BlockchainError> {
        self.calls
            .lock()
            .unwrap()
            .push((from.to_string(), content_id.to_string()));
        if let Some(error) = self.error {
            return Err(error());
        }
        Ok(MintOutcome {
            transaction_hash: "0xfeedbeef".to_string(),
            token_id: self.token_id.clone(),
        })
    }
}

// =============================================================================
// Fake pinning gateway (mblog-pin API)
// =============================================================================

#[derive(Clone, Default)]
struct GatewayState {
    fail_files: Arc<AtomicBool>,
    url_only: Arc<AtomicBool>,
    documents: Arc<Mutex<Vec<(Option<String>, Value)>>>,
    files: Arc<Mutex<Vec<(Option<String>, Option<String>, usize)>>>,
    counter: Arc<AtomicUsize>,
}

/// HTTP server speaking the `/api/files` and `/api/json` endpoints
pub struct FakeGateway {
    pub addr: SocketAddr,
    state: GatewayState,
}

impl FakeGateway {
    pub async fn start() -> Self {
        let state = GatewayState::default();
        let app = Router::new()
            .route("/api/files", post(gateway_file))
            .route("/api/json", post(gateway_json))
            .with_state(state.clone());
        let addr = serve(app).await;
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn fail_files(&self) {
        self.state.fail_files.store(true, Ordering::SeqCst);
    }

    /// Answer with a bare URL string, as older gateways did
    pub fn url_only(&self) {
        self.state.url_only.store(true, Ordering::SeqCst);
    }

    /// (pin name, document) pairs
    pub fn documents(&self) -> Vec<(Option<String>, Value)> {
        self.state.documents.lock().unwrap().clone()
    }

    /// (pin name, mime type, size) triples
    pub fn files(&self) -> Vec<(Option<String>, Option<String>, usize)> {
        self.state.files.lock().unwrap().clone()
    }
}

fn gateway_reply(state: &GatewayState, prefix: &str) -> Value {
    let n = state.counter.fetch_add(1, Ordering::SeqCst);
    let cid = format!("{}{}", prefix, n);
    let url = format!("https://gw.test/ipfs/{}", cid);
    if state.url_only.load(Ordering::SeqCst) {
        json!(url)
    } else {
        json!({"contentId": cid, "gatewayUrl": url})
    }
}

async fn gateway_file(State(state): State<GatewayState>, mut multipart: Multipart) -> impl IntoResponse {
    if state.fail_files.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": {"code": "UPSTREAM_ERROR", "message": "storage offline"}})),
        );
    }

    let mut name = None;
    let mut mime = None;
    let mut size = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "file" => {
                mime = field.content_type().map(str::to_string);
                size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            "name" => name = field.text().await.ok(),
            _ => {}
        }
    }
    state.files.lock().unwrap().push((name, mime, size));

    (StatusCode::OK, Json(gateway_reply(&state, "bafyfile")))
}

async fn gateway_json(
    State(state): State<GatewayState>,
    Query(query): Query<HashMap<String, String>>,
    Json(document): Json<Value>,
) -> impl IntoResponse {
    state
        .documents
        .lock()
        .unwrap()
        .push((query.get("name").cloned(), document));
    (StatusCode::OK, Json(gateway_reply(&state, "bafydoc")))
}

// =============================================================================
// Fake JSON-RPC wallet
// =============================================================================

#[derive(Clone)]
struct RpcState {
    chain: Arc<Mutex<String>>,
    known_chains: Arc<Mutex<Vec<String>>>,
    reject_send: Arc<AtomicBool>,
    revert: Arc<AtomicBool>,
    pending_polls: Arc<AtomicUsize>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    contract: String,
}

/// JSON-RPC server behaving like a wallet on `OTHER_CHAIN`
///
/// `wallet_switchEthereumChain` fails with 4902 until the target chain is
/// added. Receipts stay pending for `pending_polls` polls.
pub struct FakeRpcWallet {
    pub addr: SocketAddr,
    state: RpcState,
}

pub const RPC_TX_HASH: &str = "0x5555555555555555555555555555555555555555555555555555555555555555";

impl FakeRpcWallet {
    pub async fn start(contract: &str) -> Self {
        let state = RpcState {
            chain: Arc::new(Mutex::new(OTHER_CHAIN.to_string())),
            known_chains: Arc::new(Mutex::new(vec![OTHER_CHAIN.to_string()])),
            reject_send: Arc::new(AtomicBool::new(false)),
            revert: Arc::new(AtomicBool::new(false)),
            pending_polls: Arc::new(AtomicUsize::new(2)),
            calls: Arc::new(Mutex::new(Vec::new())),
            contract: contract.to_string(),
        };
        let app = Router::new()
            .route("/", post(rpc_handler))
            .with_state(state.clone());
        let addr = serve(app).await;
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn reject_send(&self) {
        self.state.reject_send.store(true, Ordering::SeqCst);
    }

    pub fn revert(&self) {
        self.state.revert.store(true, Ordering::SeqCst);
    }

    pub fn set_chain(&self, chain: &str) {
        *self.state.chain.lock().unwrap() = chain.to_string();
    }

    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

fn rpc_result(id: &Value, result: Value) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

fn rpc_error(id: &Value, code: i64, message: &str) -> Json<Value> {
    Json(json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}}))
}

async fn rpc_handler(State(state): State<RpcState>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or("").to_string();
    let params = request["params"].clone();
    state
        .calls
        .lock()
        .unwrap()
        .push((method.clone(), params.clone()));

    match method.as_str() {
        "eth_requestAccounts" => rpc_result(&id, json!([AUTHOR])),
        "eth_chainId" => rpc_result(&id, json!(state.chain.lock().unwrap().clone())),
        "eth_getBalance" => rpc_result(&id, json!("0x1bc16d674ec80000")),
        "wallet_switchEthereumChain" => {
            let wanted = params[0]["chainId"].as_str().unwrap_or("").to_string();
            let known = state.known_chains.lock().unwrap().contains(&wanted);
            if known {
                *state.chain.lock().unwrap() = wanted;
                rpc_result(&id, Value::Null)
            } else {
                rpc_error(&id, 4902, "Unrecognized chain ID")
            }
        }
        "wallet_addEthereumChain" => {
            let chain = params[0]["chainId"].as_str().unwrap_or("").to_string();
            state.known_chains.lock().unwrap().push(chain);
            rpc_result(&id, Value::Null)
        }
        "eth_sendTransaction" => {
            if state.reject_send.load(Ordering::SeqCst) {
                rpc_error(&id, 4001, "User denied transaction signature")
            } else {
                rpc_result(&id, json!(RPC_TX_HASH))
            }
        }
        "eth_getTransactionReceipt" => {
            let pending = state.pending_polls.load(Ordering::SeqCst);
            if pending > 0 {
                state.pending_polls.store(pending - 1, Ordering::SeqCst);
                return rpc_result(&id, Value::Null);
            }
            let status = if state.revert.load(Ordering::SeqCst) { "0x0" } else { "0x1" };
            rpc_result(
                &id,
                json!({
                    "transactionHash": RPC_TX_HASH,
                    "status": status,
                    "logs": [{
                        "address": state.contract,
                        "topics": [
                            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
                            format!("0x{:064x}", 0),
                            format!("0x{:0>64}", AUTHOR.trim_start_matches("0x")),
                            format!("0x{:064x}", 17),
                        ],
                        "data": "0x"
                    }]
                }),
            )
        }
        _ => rpc_error(&id, -32601, "Method not found"),
    }
}
