//! Article repository
//!
//! Keeps the single most recently published article in local storage as a
//! JSON string under a fixed key. Unreadable stored data is treated as absent.

use mblog_common::store::{KeyValueStore, PUBLISHED_ARTICLE_KEY};
use mblog_common::{BlockchainReceipt, Error, PublishedArticle, Result};
use tracing::{debug, warn};

pub struct ArticleRepository<S> {
    store: S,
}

impl<S: KeyValueStore> ArticleRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Load the persisted article; corrupted data is discarded
    pub async fn load(&self) -> Result<Option<PublishedArticle>> {
        let Some(raw) = self.store.get(PUBLISHED_ARTICLE_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<PublishedArticle>(&raw) {
            Ok(article) => Ok(Some(article)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable stored article");
                self.store.remove(PUBLISHED_ARTICLE_KEY).await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, article: &PublishedArticle) -> Result<()> {
        let raw = serde_json::to_string(article)?;
        self.store.set(PUBLISHED_ARTICLE_KEY, &raw).await?;
        debug!(content_id = %article.content_id, "Saved published article");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(PUBLISHED_ARTICLE_KEY).await
    }

    /// Attach the receipt minted for `content_id` to the persisted article
    ///
    /// Fails when no article is stored, or when the stored article was
    /// replaced by another publish while the transaction was pending.
    pub async fn attach_receipt(
        &self,
        content_id: &str,
        receipt: BlockchainReceipt,
    ) -> Result<PublishedArticle> {
        let mut article = self
            .load()
            .await?
            .ok_or_else(|| Error::NotFound("No published article to attach receipt to".to_string()))?;

        if article.content_id != content_id {
            warn!(
                stored = %article.content_id,
                minted = %content_id,
                tx_hash = %receipt.transaction_hash,
                "Receipt belongs to another article"
            );
            return Err(Error::InvalidInput(format!(
                "Receipt {} is for {}, stored article is {}",
                receipt.transaction_hash, content_id, article.content_id
            )));
        }

        article.receipt = Some(receipt);
        self.save(&article).await?;
        Ok(article)
    }
}
