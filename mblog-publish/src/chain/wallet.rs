//! Wallet provider
//!
//! The narrow capability set the publisher needs from an EIP-1193 wallet.
//! [`RpcWallet`] reaches a wallet that exposes those methods over HTTP
//! JSON-RPC (e.g. Frame on `127.0.0.1:1248`).

use async_trait::async_trait;
use mblog_common::config::NetworkConfig;
use alloy_primitives::U256;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::abi;
use super::rpc::JsonRpcClient;
use crate::error::BlockchainError;

const CHAIN_EVENT_CAPACITY: usize = 16;

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access (may prompt the user)
    async fn request_accounts(&self) -> Result<Vec<String>, BlockchainError>;

    /// Hex id of the chain the wallet is currently on
    async fn chain_id(&self) -> Result<String, BlockchainError>;

    /// Fails with [`BlockchainError::UnknownChain`] if the wallet lacks the chain
    async fn switch_chain(&self, chain_id: &str) -> Result<(), BlockchainError>;

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), BlockchainError>;

    /// Receive the new hex chain id each time the wallet changes chain
    fn subscribe_chain_changes(&self) -> broadcast::Receiver<String>;

    /// Native balance in the smallest unit
    async fn balance(&self, address: &str) -> Result<U256, BlockchainError>;
}

pub struct RpcWallet {
    rpc: Arc<JsonRpcClient>,
    chain_events: broadcast::Sender<String>,
}

impl RpcWallet {
    pub fn new(rpc: Arc<JsonRpcClient>) -> Self {
        let (chain_events, _) = broadcast::channel(CHAIN_EVENT_CAPACITY);
        Self { rpc, chain_events }
    }

    /// Poll the wallet's chain id and publish changes to subscribers
    ///
    /// HTTP wallets cannot push `chainChanged`, so changes made in the wallet
    /// UI are picked up by polling. The task ends when the handle is aborted.
    pub fn watch_chain(&self, interval: Duration) -> JoinHandle<()> {
        let rpc = Arc::clone(&self.rpc);
        let events = self.chain_events.clone();

        tokio::spawn(async move {
            let mut last: Option<String> = None;
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match rpc.call::<String>("eth_chainId", vec![]).await {
                    Ok(chain_id) => {
                        let changed = last
                            .as_deref()
                            .map(|prev| !prev.eq_ignore_ascii_case(&chain_id))
                            .unwrap_or(false);
                        if changed {
                            info!(chain_id = %chain_id, "Wallet chain changed");
                            let _ = events.send(chain_id.clone());
                        }
                        last = Some(chain_id);
                    }
                    Err(e) => debug!(error = %e, "Chain id poll failed"),
                }
            }
        })
    }

    fn notify_chain(&self, chain_id: &str) {
        // No subscribers is fine
        let _ = self.chain_events.send(chain_id.to_string());
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, BlockchainError> {
        Ok(self.rpc.call("eth_requestAccounts", vec![]).await?)
    }

    async fn chain_id(&self) -> Result<String, BlockchainError> {
        Ok(self.rpc.call("eth_chainId", vec![]).await?)
    }

    async fn switch_chain(&self, chain_id: &str) -> Result<(), BlockchainError> {
        self.rpc
            .call::<Option<Value>>("wallet_switchEthereumChain", vec![json!({ "chainId": chain_id })])
            .await?;
        self.notify_chain(chain_id);
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), BlockchainError> {
        let params = vec![json!({
            "chainId": network.chain_id,
            "chainName": network.chain_name,
            "nativeCurrency": {
                "name": network.currency_name,
                "symbol": network.currency_symbol,
                "decimals": network.currency_decimals,
            },
            "rpcUrls": network.rpc_urls,
            "blockExplorerUrls": network.block_explorer_urls,
        })];
        self.rpc
            .call::<Option<Value>>("wallet_addEthereumChain", params)
            .await?;
        info!(chain_id = %network.chain_id, chain_name = %network.chain_name, "Network added to wallet");
        Ok(())
    }

    fn subscribe_chain_changes(&self) -> broadcast::Receiver<String> {
        self.chain_events.subscribe()
    }

    async fn balance(&self, address: &str) -> Result<U256, BlockchainError> {
        let raw: String = self
            .rpc
            .call("eth_getBalance", vec![json!(address), json!("latest")])
            .await?;
        abi::parse_quantity(&raw).ok_or_else(|| {
            warn!(raw = %raw, "Unparseable balance");
            BlockchainError::Parse(format!("balance {}", raw))
        })
    }
}
