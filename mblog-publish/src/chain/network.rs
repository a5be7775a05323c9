//! Target network handling
//!
//! [`ensure_network`] moves the wallet onto the configured chain, adding the
//! chain definition first when the wallet does not know it.
//! [`NetworkMonitor`] follows chain-changed events so submission can be gated
//! on the current chain without a round trip.

use mblog_common::config::NetworkConfig;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::wallet::WalletProvider;
use crate::error::BlockchainError;

/// How the wallet ended up on the target chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    AlreadyConnected,
    Switched,
    Added,
}

pub async fn ensure_network(
    wallet: &dyn WalletProvider,
    network: &NetworkConfig,
) -> Result<NetworkStatus, BlockchainError> {
    let current = wallet.chain_id().await?;
    if network.is_target_chain(&current) {
        return Ok(NetworkStatus::AlreadyConnected);
    }

    info!(from = %current, to = %network.chain_id, "Switching wallet network");

    let status = match wallet.switch_chain(&network.chain_id).await {
        Ok(()) => NetworkStatus::Switched,
        Err(BlockchainError::UnknownChain(_)) => {
            info!(chain_name = %network.chain_name, "Chain unknown to wallet, adding it");
            wallet.add_chain(network).await?;
            wallet.switch_chain(&network.chain_id).await?;
            NetworkStatus::Added
        }
        Err(e) => return Err(e),
    };

    let now_on = wallet.chain_id().await?;
    if !network.is_target_chain(&now_on) {
        return Err(BlockchainError::WrongNetwork {
            expected: network.chain_id.clone(),
            actual: now_on,
        });
    }

    Ok(status)
}

/// Chain the wallet is on, with the verdict against the target network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    pub chain_id: String,
    pub on_target: bool,
}

/// Tracks whether the wallet is on the target chain
///
/// Every change event updates one [`ChainState`], so readers never see a
/// chain id paired with a stale verdict.
pub struct NetworkMonitor {
    expected: String,
    state: watch::Receiver<ChainState>,
    task: JoinHandle<()>,
}

impl NetworkMonitor {
    /// Read the current chain once, then follow change events
    pub async fn start(
        wallet: Arc<dyn WalletProvider>,
        network: NetworkConfig,
    ) -> Result<Self, BlockchainError> {
        // Subscribe before the initial read so no change slips in between
        let mut events = wallet.subscribe_chain_changes();
        let initial = wallet.chain_id().await?;
        let (sender, state) = watch::channel(ChainState {
            on_target: network.is_target_chain(&initial),
            chain_id: initial,
        });
        let expected = network.chain_id.clone();

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(chain_id) => {
                        let on_target = network.is_target_chain(&chain_id);
                        info!(chain_id = %chain_id, on_target, "Chain changed");
                        sender.send_replace(ChainState {
                            chain_id,
                            on_target,
                        });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed chain change events");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Ok(Self {
            expected,
            state,
            task,
        })
    }

    pub fn current(&self) -> ChainState {
        self.state.borrow().clone()
    }

    pub fn is_on_target(&self) -> bool {
        self.state.borrow().on_target
    }

    /// Receiver notified on every chain change
    pub fn subscribe(&self) -> watch::Receiver<ChainState> {
        self.state.clone()
    }

    /// Fails with [`BlockchainError::WrongNetwork`] while off the target chain
    pub fn require_target(&self) -> Result<(), BlockchainError> {
        let state = self.current();
        if state.on_target {
            Ok(())
        } else {
            Err(BlockchainError::WrongNetwork {
                expected: self.expected.clone(),
                actual: state.chain_id,
            })
        }
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
