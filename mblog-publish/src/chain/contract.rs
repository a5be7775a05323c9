//! Article contract
//!
//! `mintArticle(string contentId)` records the article's CID on chain and
//! mints an ERC-721 token to the sender. The token id is recovered from the
//! `Transfer` event in the receipt.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::abi;
use super::rpc::JsonRpcClient;
use crate::error::BlockchainError;

/// Default receipt polling interval
pub const DEFAULT_RECEIPT_POLL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintOutcome {
    pub transaction_hash: String,
    /// Decimal token id, when the receipt carries a `Transfer` event
    pub token_id: Option<String>,
}

#[async_trait]
pub trait ArticleContract: Send + Sync {
    /// Send the mint transaction from `from` and wait for it to be mined
    async fn mint_article(&self, from: &str, content_id: &str) -> Result<MintOutcome, BlockchainError>;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    /// `0x1` success, `0x0` reverted; absent on pre-Byzantium chains
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    pub address: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: String,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .and_then(abi::parse_quantity)
            .map(|s| !s.is_zero())
            .unwrap_or(true)
    }

    /// Token id from the first ERC-721 `Transfer` emitted by `contract`
    ///
    /// ERC-20 transfers are skipped; a log from any other address is used
    /// only if the contract itself emitted none.
    pub fn minted_token_id(&self, contract: &str) -> Option<String> {
        let mut minted = self.logs.iter().filter_map(|log| {
            abi::transfer_token_id(&log.topics, &log.data).map(|token| (log, token))
        });

        let (_, token) = minted
            .clone()
            .find(|(log, _)| log.address.eq_ignore_ascii_case(contract))
            .or_else(|| minted.next())?;

        Some(token.to_string())
    }
}

pub struct RpcArticleContract {
    rpc: Arc<JsonRpcClient>,
    address: String,
    signature: String,
    poll_interval: Duration,
}

impl RpcArticleContract {
    pub fn new(rpc: Arc<JsonRpcClient>, address: &str) -> Self {
        Self {
            rpc,
            address: address.to_string(),
            signature: abi::DEFAULT_MINT_SIGNATURE.to_string(),
            poll_interval: DEFAULT_RECEIPT_POLL,
        }
    }

    pub fn with_signature(mut self, signature: &str) -> Self {
        self.signature = signature.to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Poll until the transaction is mined
    ///
    /// There is no local deadline: a transaction stuck in the mempool keeps
    /// the call waiting until the transport gives up.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<TransactionReceipt, BlockchainError> {
        loop {
            let receipt: Option<TransactionReceipt> = self
                .rpc
                .call("eth_getTransactionReceipt", vec![json!(tx_hash)])
                .await?;

            match receipt {
                Some(receipt) => return Ok(receipt),
                None => {
                    debug!(tx_hash, "Transaction pending");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
    }
}

#[async_trait]
impl ArticleContract for RpcArticleContract {
    async fn mint_article(&self, from: &str, content_id: &str) -> Result<MintOutcome, BlockchainError> {
        let data = abi::mint_calldata(&self.signature, content_id);
        let tx = vec![json!({
            "from": from,
            "to": self.address,
            "data": abi::to_hex(&data),
        })];

        info!(contract = %self.address, content_id, "Sending mint transaction");
        let tx_hash: String = self.rpc.call("eth_sendTransaction", tx).await?;
        info!(tx_hash = %tx_hash, "Mint transaction sent, waiting for receipt");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if !receipt.succeeded() {
            warn!(tx_hash = %tx_hash, "Mint transaction reverted");
            return Err(BlockchainError::Reverted { tx_hash });
        }

        let token_id = receipt.minted_token_id(&self.address);
        if token_id.is_none() {
            warn!(tx_hash = %tx_hash, "No Transfer event in receipt");
        }

        Ok(MintOutcome {
            transaction_hash: receipt.transaction_hash,
            token_id,
        })
    }
}
