//! Blockchain Submitter
//!
//! Records a published article on chain and reports the reward. The reward
//! is `floor(score / 10)` tokens, computed here from the score that was
//! submitted rather than read back from the contract.

use mblog_common::config::NetworkConfig;
use mblog_common::{BlockchainReceipt, ValidationError};
use std::sync::Arc;
use tracing::info;

use crate::chain::{ArticleContract, NetworkMonitor, WalletProvider};
use crate::error::{BlockchainError, Result};
use crate::scorer;

pub struct BlockchainSubmitter {
    wallet: Arc<dyn WalletProvider>,
    contract: Arc<dyn ArticleContract>,
    network: NetworkConfig,
    monitor: Option<NetworkMonitor>,
}

impl BlockchainSubmitter {
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        contract: Arc<dyn ArticleContract>,
        network: NetworkConfig,
    ) -> Self {
        Self {
            wallet,
            contract,
            network,
            monitor: None,
        }
    }

    /// Refuse to mint as soon as the monitor sees the wallet leave the target
    /// chain, before asking the wallet again
    pub fn with_monitor(mut self, monitor: NetworkMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Mint the article token for `content_id` from `author`
    ///
    /// The wallet must already be on the target chain; call
    /// [`crate::chain::ensure_network`] first.
    pub async fn submit(
        &self,
        content_id: &str,
        quality_score: u32,
        author: &str,
    ) -> Result<BlockchainReceipt> {
        let content_id = content_id.trim();
        if content_id.is_empty() {
            return Err(ValidationError::MissingField("contentId").into());
        }
        if quality_score > 100 {
            return Err(ValidationError::ScoreOutOfRange(quality_score).into());
        }
        let author = author.trim();
        if author.is_empty() {
            return Err(ValidationError::WalletNotConnected.into());
        }

        if let Some(monitor) = &self.monitor {
            monitor.require_target()?;
        }
        let chain_id = self.wallet.chain_id().await?;
        if !self.network.is_target_chain(&chain_id) {
            return Err(BlockchainError::WrongNetwork {
                expected: self.network.chain_id.clone(),
                actual: chain_id,
            }
            .into());
        }

        let outcome = self.contract.mint_article(author, content_id).await?;
        let tokens_earned = scorer::tokens_for_score(quality_score as u8);

        info!(
            tx_hash = %outcome.transaction_hash,
            token_id = ?outcome.token_id,
            tokens_earned,
            "Article recorded on chain"
        );

        Ok(BlockchainReceipt {
            explorer_url: self.network.explorer_tx_url(&outcome.transaction_hash),
            transaction_hash: outcome.transaction_hash,
            token_id: outcome.token_id,
            tokens_earned,
        })
    }
}
