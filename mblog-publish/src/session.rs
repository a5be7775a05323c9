//! Wallet session
//!
//! Remembers the connected account across runs so `publish` and `submit`
//! can use it without prompting the wallet again.

use mblog_common::store::{KeyValueStore, WALLET_ADDRESS_KEY};
use mblog_common::ValidationError;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::chain::{abi, WalletProvider};
use crate::error::{BlockchainError, Result};

pub struct WalletSession<S> {
    wallet: Arc<dyn WalletProvider>,
    store: S,
    address: RwLock<Option<String>>,
}

impl<S: KeyValueStore> WalletSession<S> {
    /// Session with the address remembered from a previous run, if any
    pub async fn restore(wallet: Arc<dyn WalletProvider>, store: S) -> Result<Self> {
        let address = store
            .get(WALLET_ADDRESS_KEY)
            .await?
            .filter(|a| !a.trim().is_empty());
        if let Some(address) = &address {
            info!(address = %address, "Restored wallet session");
        }

        Ok(Self {
            wallet,
            store,
            address: RwLock::new(address),
        })
    }

    /// Request account access and remember the first account
    pub async fn connect(&self) -> Result<String> {
        let accounts = self.wallet.request_accounts().await?;
        let address = accounts
            .into_iter()
            .find(|a| !a.trim().is_empty())
            .ok_or(BlockchainError::NoAccount)?;

        self.store.set(WALLET_ADDRESS_KEY, &address).await?;
        *self.address.write().await = Some(address.clone());
        info!(address = %address, "Wallet connected");
        Ok(address)
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.store.remove(WALLET_ADDRESS_KEY).await?;
        *self.address.write().await = None;
        info!("Wallet disconnected");
        Ok(())
    }

    pub async fn address(&self) -> Option<String> {
        self.address.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.address.read().await.is_some()
    }

    /// Connected address, or [`ValidationError::WalletNotConnected`]
    pub async fn require_address(&self) -> Result<String> {
        self.address()
            .await
            .ok_or_else(|| ValidationError::WalletNotConnected.into())
    }

    /// Native balance of the connected account, formatted with `decimals`
    pub async fn balance(&self, decimals: u8) -> Result<String> {
        let address = self.require_address().await?;
        let balance = self.wallet.balance(&address).await?;
        Ok(abi::format_balance(balance, decimals)?)
    }
}
