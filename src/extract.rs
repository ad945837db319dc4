// src/extract.rs
//! Full-text retrieval through a reader-style extraction endpoint. The
//! endpoint takes `<prefix><article-url>` and returns the article as
//! markdown. Any failure degrades to an empty result; the caller decides
//! whether the feed summary is an acceptable substitute.

use std::time::Duration;

use async_trait::async_trait;

use crate::images;

pub const DEFAULT_READER_PREFIX: &str = "https://r.jina.ai/";
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(15);

/// Cap on retrieved text, to respect the generative service's context limit.
pub const MAX_CONTENT_CHARS: usize = 4000;

#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub text: Option<String>,
    pub image: Option<String>,
}

#[async_trait]
pub trait ContentExtractor: Send + Sync {
    /// Readable text (truncated) and a candidate image for one URL.
    /// Never fails; an unreachable or unhappy service yields
    /// `Extracted::default()`.
    async fn extract(&self, url: &str) -> Extracted;
}

pub struct ReaderExtractor {
    http: reqwest::Client,
    prefix: String,
}

impl ReaderExtractor {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            prefix: DEFAULT_READER_PREFIX.to_string(),
        }
    }
}

#[async_trait]
impl ContentExtractor for ReaderExtractor {
    async fn extract(&self, url: &str) -> Extracted {
        let reader_url = format!("{}{}", self.prefix, url);
        let resp = self
            .http
            .get(&reader_url)
            .timeout(EXTRACT_TIMEOUT)
            .header("Accept", "text/markdown")
            .header("X-Return-Format", "markdown")
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let resp = match resp {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(url, error = %e, "extraction failed");
                return Extracted::default();
            }
        };

        let text = match resp.text().await {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(url, error = %e, "extraction body unreadable");
                return Extracted::default();
            }
        };

        // Image is taken from the full text, before the context-limit cut.
        let image = images::image_from_text(&text);
        let truncated: String = text.chars().take(MAX_CONTENT_CHARS).collect();
        Extracted {
            text: Some(truncated),
            image,
        }
    }
}
