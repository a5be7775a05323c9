//! Common error types for Mini Blogs

use thiserror::Error;

/// Common result type for Mini Blogs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the publisher and the pinning gateway
#[derive(Error, Debug)]
pub enum Error {
    /// Local storage error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored or transmitted JSON could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input that does not match the stored state
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
