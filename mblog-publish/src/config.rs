//! Publisher configuration
//!
//! Settings resolve CLI → `MBLOG_*` environment → `[client]` TOML section →
//! compiled default. The contract address has no default; only `submit`
//! needs it.

use mblog_common::config::{resolve_optional, resolve_setting, NetworkConfig, TomlConfig};
use std::path::PathBuf;
use std::time::Duration;

use crate::chain::abi::DEFAULT_MINT_SIGNATURE;
use crate::chain::contract::DEFAULT_RECEIPT_POLL;
use crate::uploader::DEFAULT_BACKEND_URL;

/// Frame's local JSON-RPC endpoint
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

pub const BACKEND_URL_ENV: &str = "MBLOG_BACKEND_URL";
pub const WALLET_RPC_URL_ENV: &str = "MBLOG_WALLET_RPC_URL";
pub const CONTRACT_ADDRESS_ENV: &str = "MBLOG_CONTRACT_ADDRESS";
pub const MINT_SIGNATURE_ENV: &str = "MBLOG_MINT_SIGNATURE";

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub backend_url: Option<String>,
    pub wallet_rpc_url: Option<String>,
    pub contract_address: Option<String>,
    pub data_folder: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub backend_url: String,
    pub wallet_rpc_url: String,
    pub contract_address: Option<String>,
    pub mint_signature: String,
    pub receipt_poll: Duration,
    pub data_folder: PathBuf,
    pub network: NetworkConfig,
}

impl ClientConfig {
    pub fn resolve(overrides: &ClientOverrides, toml_config: &TomlConfig) -> Self {
        let client = &toml_config.client;

        let backend_url = resolve_setting(
            overrides.backend_url.as_deref(),
            BACKEND_URL_ENV,
            client.backend_url.as_deref(),
            DEFAULT_BACKEND_URL,
        );
        let wallet_rpc_url = resolve_setting(
            overrides.wallet_rpc_url.as_deref(),
            WALLET_RPC_URL_ENV,
            client.wallet_rpc_url.as_deref(),
            DEFAULT_WALLET_RPC_URL,
        );
        let contract_address = resolve_optional(
            overrides.contract_address.as_deref(),
            CONTRACT_ADDRESS_ENV,
            client.contract_address.as_deref(),
        );
        let mint_signature = resolve_setting(
            None,
            MINT_SIGNATURE_ENV,
            client.mint_signature.as_deref(),
            DEFAULT_MINT_SIGNATURE,
        );
        let receipt_poll = client
            .receipt_poll_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_RECEIPT_POLL);

        Self {
            backend_url,
            wallet_rpc_url,
            contract_address,
            mint_signature,
            receipt_poll,
            data_folder: mblog_common::config::resolve_data_folder(
                overrides.data_folder.as_deref(),
                toml_config,
            ),
            network: toml_config.network.clone(),
        }
    }
}
