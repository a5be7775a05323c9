//! Wallet and contract access
//!
//! The wallet is an external EIP-1193 provider reached over JSON-RPC. It signs
//! and sends transactions; this crate never holds a private key.

pub mod abi;
pub mod contract;
pub mod network;
pub mod rpc;
pub mod wallet;

pub use contract::{ArticleContract, MintOutcome, RpcArticleContract};
pub use network::{ensure_network, ChainState, NetworkMonitor, NetworkStatus};
pub use rpc::{JsonRpcClient, RpcError};
pub use wallet::{RpcWallet, WalletProvider};
