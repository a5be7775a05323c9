//! Publish Orchestrator
//!
//! State progression, strictly sequential:
//! VALIDATING → UPLOADING COVER → UPLOADING METADATA → SCORING → SAVED
//!
//! A failed cover upload is logged and publishing continues without a cover.
//! A failed metadata upload aborts the publish: no article is produced and
//! nothing is written to local storage.

use chrono::{DateTime, Utc};
use mblog_common::store::KeyValueStore;
use mblog_common::{cid, time, ArticleDraft, ArticleMetadata, PublishedArticle, ValidationError};
use tracing::{info, warn};

use crate::error::{Result, UploadError};
use crate::repository::ArticleRepository;
use crate::scorer::{self, ScoreInput};
use crate::uploader::ContentUploader;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Publish workflow service
pub struct Publisher<U, S> {
    uploader: U,
    repository: ArticleRepository<S>,
    clock: Clock,
}

impl<U: ContentUploader, S: KeyValueStore> Publisher<U, S> {
    pub fn new(uploader: U, repository: ArticleRepository<S>) -> Self {
        Self {
            uploader,
            repository,
            clock: Box::new(time::now),
        }
    }

    /// Replace the wall clock (tests pin the publish timestamp)
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Publish a draft on behalf of `author`
    pub async fn publish(&self, draft: &ArticleDraft, author: &str) -> Result<PublishedArticle> {
        let category = draft.validate()?;
        let author = author.trim();
        if author.is_empty() {
            return Err(ValidationError::WalletNotConnected.into());
        }

        let created_at = (self.clock)();
        info!(title = %draft.title, author, "Starting publish");

        // Step 1: cover image (non-fatal)
        let cover_image = match &draft.cover_image {
            Some(bytes) => {
                info!(size = bytes.len(), "Uploading cover image");
                match self.uploader.upload_file(bytes.clone()).await {
                    Ok(result) => {
                        info!(cid = %result.content_id, "Cover image uploaded");
                        Some(result.gateway_url)
                    }
                    Err(e) => {
                        warn!(error = %e, "Cover image upload failed, publishing without cover");
                        None
                    }
                }
            }
            None => None,
        };

        // Step 2: metadata document
        let metadata = ArticleMetadata {
            title: draft.title.clone(),
            excerpt: draft.effective_excerpt(),
            content: draft.content.clone(),
            category: category.label().to_string(),
            cover_image: cover_image.clone(),
            timestamp: time::to_iso8601(created_at),
            author: author.to_string(),
        };
        let document = serde_json::to_value(&metadata).map_err(mblog_common::Error::from)?;

        // Step 3: metadata upload (fatal)
        info!("Uploading article metadata");
        let uploaded = self.uploader.upload_json(&document).await?;

        // Step 4: identifier comes from the gateway URL
        let content_id = cid::extract_content_id(&uploaded.gateway_url)
            .or_else(|| Some(uploaded.content_id.trim().to_string()).filter(|c| !c.is_empty()))
            .ok_or_else(|| {
                UploadError::InvalidResponse(format!(
                    "No content id in gateway URL {}",
                    uploaded.gateway_url
                ))
            })?;
        info!(cid = %content_id, url = %uploaded.gateway_url, "Article metadata uploaded");

        // Step 5: score the draft as written
        let quality_score = scorer::score(&ScoreInput {
            title: &draft.title,
            content: &draft.content,
            category: &draft.category,
        });

        let article = PublishedArticle {
            content_id,
            gateway_url: uploaded.gateway_url,
            quality_score,
            title: metadata.title,
            excerpt: metadata.excerpt,
            content: metadata.content,
            category: metadata.category,
            cover_image,
            created_at,
            receipt: None,
        };

        self.repository.save(&article).await?;

        info!(
            cid = %article.content_id,
            quality_score,
            estimated_tokens = article.estimated_tokens(),
            "Publish completed"
        );

        Ok(article)
    }

    /// Most recently published article, if any
    pub async fn last_published(&self) -> Result<Option<PublishedArticle>> {
        Ok(self.repository.load().await?)
    }

    /// Forget the published article to start a new one
    pub async fn reset(&self) -> Result<()> {
        self.repository.clear().await?;
        info!("Published article cleared");
        Ok(())
    }
}
