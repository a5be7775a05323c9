//! # Mini Blogs publisher
//!
//! Turns a draft into a permanently stored, scored article and optionally
//! records it on chain:
//! - [`orchestrator::Publisher`]: validate, upload cover and metadata, score, persist
//! - [`submitter::BlockchainSubmitter`]: mint the article token through the wallet
//! - [`session::WalletSession`]: the connected account

pub mod chain;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod repository;
pub mod scorer;
pub mod session;
pub mod submitter;
pub mod uploader;

pub use error::{BlockchainError, PublishError, Result, UploadError};
pub use orchestrator::Publisher;
pub use repository::ArticleRepository;
pub use session::WalletSession;
pub use submitter::BlockchainSubmitter;
pub use uploader::{ContentUploader, GatewayUploader};
