//! Article data model
//!
//! Lifecycle of an article through the publish workflow:
//! `ArticleDraft` (in memory, form input) → `ArticleMetadata` (the JSON document
//! pinned to content-addressed storage) → `PublishedArticle` (persisted locally)
//! → optionally a `BlockchainReceipt` attached after on-chain submission.
//!
//! Every length rule counts Unicode scalar values, not bytes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum excerpt length accepted from the author
pub const MAX_EXCERPT_CHARS: usize = 300;

/// Number of content characters used when the excerpt is left blank
pub const EXCERPT_FALLBACK_CHARS: usize = 150;

/// Form validation failures, surfaced before any network call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Excerpt is {0} characters long (maximum {MAX_EXCERPT_CHARS})")]
    ExcerptTooLong(usize),

    #[error("Cover image is not a recognised image format")]
    UnsupportedCoverImage,

    #[error("Quality score {0} is out of range (0-100)")]
    ScoreOutOfRange(u32),

    #[error("No wallet connected")]
    WalletNotConnected,
}

/// Article categories offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Blockchain,
    Tokenomics,
    Technology,
    Community,
    #[serde(rename = "Smart Contracts")]
    SmartContracts,
    Privacy,
    #[serde(rename = "IPFS")]
    Ipfs,
    Web3,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Blockchain,
        Category::Tokenomics,
        Category::Technology,
        Category::Community,
        Category::SmartContracts,
        Category::Privacy,
        Category::Ipfs,
        Category::Web3,
    ];

    /// Display label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Category::Blockchain => "Blockchain",
            Category::Tokenomics => "Tokenomics",
            Category::Technology => "Technology",
            Category::Community => "Community",
            Category::SmartContracts => "Smart Contracts",
            Category::Privacy => "Privacy",
            Category::Ipfs => "IPFS",
            Category::Web3 => "Web3",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownCategory(wanted.to_string()))
    }
}

/// Article as composed by the author, before publishing
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub title: String,
    /// Optional; derived from content when blank
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub cover_image: Option<Vec<u8>>,
}

impl ArticleDraft {
    /// Check required fields and limits
    pub fn validate(&self) -> Result<Category, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MissingField("content"));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        let category = self.category.parse::<Category>()?;

        let excerpt_len = self.excerpt.chars().count();
        if excerpt_len > MAX_EXCERPT_CHARS {
            return Err(ValidationError::ExcerptTooLong(excerpt_len));
        }

        if let Some(bytes) = &self.cover_image {
            if !infer::is_image(bytes) {
                return Err(ValidationError::UnsupportedCoverImage);
            }
        }

        Ok(category)
    }

    /// Excerpt as published: the author's excerpt, or the first 150 characters
    /// of content followed by an ellipsis
    pub fn effective_excerpt(&self) -> String {
        if self.excerpt.trim().is_empty() {
            let head: String = self.content.chars().take(EXCERPT_FALLBACK_CHARS).collect();
            format!("{}...", head)
        } else {
            self.excerpt.clone()
        }
    }
}

/// JSON document pinned to content-addressed storage for each article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    /// Gateway URL of the cover image; `null` when absent or its upload failed
    pub cover_image: Option<String>,
    /// ISO-8601 publish time
    pub timestamp: String,
    /// Wallet address of the author
    pub author: String,
}

/// Result of pinning one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub content_id: String,
    pub gateway_url: String,
}

/// Record of a successful on-chain submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainReceipt {
    pub transaction_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    /// Client-side estimate: floor(quality score / 10)
    pub tokens_earned: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
}

/// Article after a successful publish, persisted locally until reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedArticle {
    /// CID of the metadata document
    pub content_id: String,
    pub gateway_url: String,
    /// Always within 0..=100
    pub quality_score: u8,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<BlockchainReceipt>,
}

impl PublishedArticle {
    /// Reward estimate shown before submission
    pub fn estimated_tokens(&self) -> u32 {
        u32::from(self.quality_score) / 10
    }
}
