// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One normalized syndication item. Ephemeral: produced by the crawl,
/// consumed once per run by the deduplicator.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    /// Unique source URL.
    pub link: String,
    /// Cleaned description/content, used as degraded article text.
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub source_name: String,
    /// Representative image from the feed item, if any.
    pub raw_image: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_items(&self) -> Result<Vec<FeedItem>>;
    fn name(&self) -> &str;
}
