//! Error types for the publish workflow
//!
//! Three failure families reach the user:
//! - `ValidationError`: missing form fields or no wallet; raised before any I/O
//! - `UploadError`: the pinning gateway was unreachable or refused the upload
//! - `BlockchainError`: wallet rejection, wrong network, contract revert
//!
//! None of them is retried automatically.

use mblog_common::ValidationError;
use thiserror::Error;

/// Content upload failures
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Storage gateway unreachable: {0}")]
    Network(String),

    #[error("Storage gateway rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Wallet and contract failures
#[derive(Debug, Error)]
pub enum BlockchainError {
    #[error("Request rejected in wallet")]
    UserRejected,

    #[error("Wrong network: expected {expected}, wallet is on {actual}")]
    WrongNetwork { expected: String, actual: String },

    #[error("Network not configured in wallet: {0}")]
    UnknownChain(String),

    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),

    #[error("Transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Wallet returned no accounts")]
    NoAccount,

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Wallet unreachable: {0}")]
    Network(String),

    #[error("Unexpected wallet response: {0}")]
    Parse(String),
}

/// Any failure of a workflow operation
#[derive(Debug, Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Blockchain submission failed: {0}")]
    Blockchain(#[from] BlockchainError),

    #[error("Local storage error: {0}")]
    Storage(#[from] mblog_common::Error),
}

/// Result type for workflow operations
pub type Result<T> = std::result::Result<T, PublishError>;
