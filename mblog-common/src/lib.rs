//! # Mini Blogs Common Library
//!
//! Shared code for the Mini Blogs publisher and pinning gateway:
//! - Article data model (drafts, metadata documents, published records, receipts)
//! - Content identifier helpers
//! - Configuration loading
//! - Local key-value storage
//! - Timestamp utilities

pub mod cid;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod time;

pub use error::{Error, Result};
pub use models::{
    ArticleDraft, ArticleMetadata, BlockchainReceipt, Category, PublishedArticle, UploadResult,
    ValidationError,
};
