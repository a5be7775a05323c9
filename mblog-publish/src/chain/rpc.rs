//! JSON-RPC 2.0 client for the wallet endpoint

use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::error::BlockchainError;

/// EIP-1193: the user rejected the request
pub const USER_REJECTED_CODE: i32 = 4001;

/// EIP-3326: the requested chain has not been added to the wallet
pub const UNRECOGNIZED_CHAIN_CODE: i32 = 4902;

/// Wallet prompts wait on the user
const WALLET_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Server { code: i32, message: String },

    #[error("Malformed RPC response: {0}")]
    Parse(String),
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Call(object) => RpcError::Server {
                code: object.code(),
                message: object.message().to_string(),
            },
            ClientError::ParseError(e) => RpcError::Parse(e.to_string()),
            other => RpcError::Transport(other.to_string()),
        }
    }
}

impl From<RpcError> for BlockchainError {
    fn from(err: RpcError) -> Self {
        match err {
            RpcError::Transport(msg) => BlockchainError::Network(msg),
            RpcError::Parse(msg) => BlockchainError::Parse(msg),
            RpcError::Server { code, .. } if code == USER_REJECTED_CODE => {
                BlockchainError::UserRejected
            }
            RpcError::Server { code, message } if code == UNRECOGNIZED_CHAIN_CODE => {
                BlockchainError::UnknownChain(message)
            }
            RpcError::Server { message, .. }
                if message.to_lowercase().contains("insufficient funds") =>
            {
                BlockchainError::InsufficientFunds(message)
            }
            RpcError::Server { code, message } => BlockchainError::Rpc {
                code: i64::from(code),
                message,
            },
        }
    }
}

pub struct JsonRpcClient {
    client: HttpClient,
}

impl JsonRpcClient {
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let client = HttpClientBuilder::default()
            .request_timeout(WALLET_REQUEST_TIMEOUT)
            .build(url)?;
        Ok(Self { client })
    }

    /// Call `method` with positional params
    ///
    /// A `null` result only deserializes into an `Option<_>`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T, RpcError> {
        let mut array = ArrayParams::new();
        for param in params {
            array
                .insert(param)
                .map_err(|e| RpcError::Parse(e.to_string()))?;
        }

        tracing::debug!(method, "Sending RPC request");

        self.client.request(method, array).await.map_err(|e| {
            let err = RpcError::from(e);
            tracing::debug!(method, error = %err, "RPC request failed");
            err
        })
    }
}
