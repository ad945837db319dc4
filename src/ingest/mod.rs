// src/ingest/mod.rs
pub mod rss;
pub mod types;

use chrono::{Duration, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

use crate::config::PipelineConfig;
use crate::ingest::rss::RssFeedProvider;
use crate::ingest::types::{FeedItem, FeedProvider};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("crawl_items_total", "Items parsed from feeds.");
        describe_counter!(
            "crawl_kept_total",
            "Items kept after the recency-window filter."
        );
        describe_counter!("crawl_provider_errors_total", "Feed fetch/parse errors.");
        describe_histogram!("crawl_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Build one provider per configured feed URL, grouped under its portal name.
pub fn providers_from_config(
    cfg: &PipelineConfig,
    http: &reqwest::Client,
) -> Vec<Box<dyn FeedProvider>> {
    let mut out: Vec<Box<dyn FeedProvider>> = Vec::new();
    for portal in &cfg.portals {
        for feed_url in &portal.feeds {
            out.push(Box::new(RssFeedProvider::new(
                http.clone(),
                &portal.name,
                feed_url,
            )));
        }
    }
    out
}

/// Crawl every provider and keep items published within the window. A failing
/// provider is logged and skipped; it never aborts the crawl. The union is
/// returned unsorted.
pub async fn crawl(providers: &[Box<dyn FeedProvider>], window: Duration) -> Vec<FeedItem> {
    ensure_metrics_described();

    let cutoff = Utc::now() - window;
    let mut items = Vec::new();

    for provider in providers {
        match provider.fetch_items().await {
            Ok(fetched) => {
                let total = fetched.len();
                let mut kept = fetched
                    .into_iter()
                    .filter(|item| item.published_at >= cutoff)
                    .collect::<Vec<_>>();
                tracing::info!(
                    source = provider.name(),
                    fetched = total,
                    kept = kept.len(),
                    "feed crawled"
                );
                counter!("crawl_kept_total").increment(kept.len() as u64);
                items.append(&mut kept);
            }
            Err(e) => {
                tracing::warn!(source = provider.name(), error = ?e, "feed failed, skipping");
                counter!("crawl_provider_errors_total").increment(1);
            }
        }
    }

    items
}
