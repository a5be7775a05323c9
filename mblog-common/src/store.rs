//! Local durable key-value storage
//!
//! Holds the handful of values that must survive a restart: the most recently
//! published article and the last connected wallet address. Backed by a
//! `settings` table in SQLite with upsert semantics.

use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Key of the serialized most-recent `PublishedArticle`
pub const PUBLISHED_ARTICLE_KEY: &str = "publishedArticle";

/// Key of the last connected wallet address
pub const WALLET_ADDRESS_KEY: &str = "walletAddress";

/// Database file name inside the data folder
pub const DATABASE_FILE: &str = "mblog.db";

/// String key-value persistence
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    db: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the store inside `data_folder`
    pub async fn open(data_folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_folder)?;
        let db_path = data_folder.join(DATABASE_FILE);

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))
            .map_err(Error::Database)?
            .create_if_missing(true);

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!(path = %db_path.display(), "Opened local store");
        Self::from_pool(db).await
    }

    /// In-memory store; contents vanish when dropped
    pub async fn in_memory() -> Result<Self> {
        // A single connection keeps every query on the same memory database
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(db).await
    }

    /// Wrap an existing pool, creating the settings table if needed
    pub async fn from_pool(db: SqlitePool) -> Result<Self> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
        )
        .execute(&db)
        .await?;

        Ok(Self { db })
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
