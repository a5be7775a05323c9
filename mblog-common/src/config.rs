//! Configuration loading and resolution
//!
//! Every setting resolves in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`MBLOG_*`)
//! 3. TOML config file (`~/.config/mblog/config.toml` by default)
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error: a warning is logged and defaults apply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "MBLOG_CONFIG";

/// Environment variable overriding the local data folder
pub const DATA_FOLDER_ENV: &str = "MBLOG_DATA_FOLDER";

/// Default pinning gateway bind address
pub const DEFAULT_PIN_BIND: &str = "127.0.0.1:5780";

/// Default request body limit of the pinning gateway (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Environment variable overriding the upload limit
pub const MAX_UPLOAD_BYTES_ENV: &str = "MBLOG_MAX_UPLOAD_BYTES";

/// Complete TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the local SQLite store
    #[serde(default)]
    pub data_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub pin: PinSection,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[pin]` section: pinning gateway settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinSection {
    /// Address the gateway listens on
    pub bind: Option<String>,
    /// Pinning service JWT. Prefer `MBLOG_PINATA_JWT` over storing it here.
    pub pinata_jwt: Option<String>,
    /// Pinning service upload API base URL
    pub pinata_api_url: Option<String>,
    /// Gateway domain used to resolve CIDs to URLs
    pub gateway: Option<String>,
    /// Maximum accepted request body in bytes
    pub max_upload_bytes: Option<usize>,
}

/// `[client]` section: publisher settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSection {
    /// Base URL of the pinning gateway
    pub backend_url: Option<String>,
    /// JSON-RPC endpoint of the wallet
    pub wallet_rpc_url: Option<String>,
    /// Address of the article contract
    pub contract_address: Option<String>,
    /// Solidity signature of the mint call
    pub mint_signature: Option<String>,
    /// Receipt polling interval in milliseconds
    pub receipt_poll_ms: Option<u64>,
}

/// Target chain description, as handed to the wallet when adding the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Hex chain id, e.g. `0xa045c`
    #[serde(default = "default_chain_id")]
    pub chain_id: String,
    #[serde(default = "default_chain_name")]
    pub chain_name: String,
    #[serde(default = "default_currency_name")]
    pub currency_name: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_currency_decimals")]
    pub currency_decimals: u8,
    #[serde(default = "default_rpc_urls")]
    pub rpc_urls: Vec<String>,
    #[serde(default = "default_explorer_urls")]
    pub block_explorer_urls: Vec<String>,
}

fn default_chain_id() -> String {
    "0xa045c".to_string()
}

fn default_chain_name() -> String {
    "Open Campus Codex Sepolia".to_string()
}

fn default_currency_name() -> String {
    "EDU".to_string()
}

fn default_currency_symbol() -> String {
    "EDU".to_string()
}

fn default_currency_decimals() -> u8 {
    18
}

fn default_rpc_urls() -> Vec<String> {
    vec!["https://rpc.open-campus-codex.gelato.digital".to_string()]
}

fn default_explorer_urls() -> Vec<String> {
    vec!["https://opencampus-codex.blockscout.com".to_string()]
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            chain_name: default_chain_name(),
            currency_name: default_currency_name(),
            currency_symbol: default_currency_symbol(),
            currency_decimals: default_currency_decimals(),
            rpc_urls: default_rpc_urls(),
            block_explorer_urls: default_explorer_urls(),
        }
    }
}

impl NetworkConfig {
    /// Chain ids compare numerically: `0xA045C` and `0xa045c` are the same chain
    pub fn is_target_chain(&self, chain_id: &str) -> bool {
        match (parse_hex_u64(&self.chain_id), parse_hex_u64(chain_id)) {
            (Some(a), Some(b)) => a == b,
            _ => self.chain_id.eq_ignore_ascii_case(chain_id.trim()),
        }
    }

    /// Block explorer link for a transaction
    pub fn explorer_tx_url(&self, tx_hash: &str) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{}", base.trim_end_matches('/'), tx_hash))
    }
}

fn parse_hex_u64(value: &str) -> Option<u64> {
    let value = value.trim();
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

/// Pick the first present value in priority order: CLI → ENV → TOML → default
pub fn resolve_setting(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
    default: &str,
) -> String {
    if let Some(value) = cli_arg.filter(|v| !v.trim().is_empty()) {
        return value.to_string();
    }
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.trim().is_empty() {
            return value;
        }
    }
    if let Some(value) = toml_value.filter(|v| !v.trim().is_empty()) {
        return value.to_string();
    }
    default.to_string()
}

/// Like [`resolve_setting`] but without a compiled default
pub fn resolve_optional(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<String> {
    let value = resolve_setting(cli_arg, env_var_name, toml_value, "");
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Upload limit in bytes: CLI → `MBLOG_MAX_UPLOAD_BYTES` → TOML → default
///
/// An environment value that is not a byte count is a configuration error
/// rather than silently ignored.
pub fn resolve_max_upload_bytes(cli_arg: Option<usize>, toml_value: Option<usize>) -> Result<usize> {
    if let Some(limit) = cli_arg {
        return Ok(limit);
    }
    if let Ok(value) = std::env::var(MAX_UPLOAD_BYTES_ENV) {
        let value = value.trim();
        if !value.is_empty() {
            return value.parse().map_err(|_| {
                Error::Config(format!("{} is not a byte count: {}", MAX_UPLOAD_BYTES_ENV, value))
            });
        }
    }
    Ok(toml_value.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES))
}

/// Default config file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mblog").join("config.toml"))
}

/// Locate the config file: CLI path → `MBLOG_CONFIG` → platform default
pub fn config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    default_config_path()
}

/// Load the TOML config, falling back to defaults when the file is missing
///
/// A present but malformed file is an error: silently ignoring it would hide
/// a misconfigured credential or contract address.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config directory available, using defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Resolve the local data folder: CLI → `MBLOG_DATA_FOLDER` → TOML → OS default
pub fn resolve_data_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = &toml_config.data_folder {
        return path.clone();
    }
    default_data_folder()
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("mblog"))
        .unwrap_or_else(|| PathBuf::from("./mblog_data"))
}
