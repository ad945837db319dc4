// src/ingest/rss.rs
//! Generic RSS provider: one instance per configured feed URL. Parses the
//! standard item fields plus enclosure/media images via quick-xml.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::images;
use crate::ingest::types::{FeedItem, FeedProvider};

const FEED_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    #[serde(rename = "content:encoded")]
    content_encoded: Option<String>,
    #[serde(rename = "enclosure", default)]
    enclosure: Vec<MediaRef>,
    #[serde(rename = "media:content", default)]
    media_content: Vec<MediaRef>,
    #[serde(rename = "media:thumbnail", default)]
    media_thumbnail: Vec<MediaRef>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Strip a feed description down to plain text: decode HTML entities, drop
/// tags, collapse whitespace.
pub fn clean_summary(s: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let decoded = html_escape::decode_html_entities(s).to_string();
    let stripped = re_tags.replace_all(&decoded, " ");
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

fn first_image_url(refs: &[MediaRef]) -> Option<String> {
    refs.iter()
        .filter_map(|r| r.url.as_deref())
        .find(|u| images::is_image_url(u))
        .map(|u| u.to_string())
}

/// Representative image for one item, in priority order: enclosure,
/// media:content, media:thumbnail, then an `<img>` tag in the HTML body.
fn item_image(item: &Item) -> Option<String> {
    first_image_url(&item.enclosure)
        .or_else(|| first_image_url(&item.media_content))
        .or_else(|| first_image_url(&item.media_thumbnail))
        .or_else(|| {
            let html = item
                .content_encoded
                .as_deref()
                .or(item.description.as_deref())
                .unwrap_or_default();
            images::image_from_html(html)
        })
}

/// Parse one RSS document into feed items. Items without a title or link are
/// dropped; a missing/unparseable pubDate falls back to `now`.
pub fn parse_rss(source_name: &str, xml: &str) -> Result<Vec<FeedItem>> {
    let t0 = std::time::Instant::now();

    let rss: Rss = from_str(xml).context("parsing rss xml")?;
    let mut out = Vec::with_capacity(rss.channel.item.len());

    for item in &rss.channel.item {
        let title = item.title.as_deref().unwrap_or_default().trim().to_string();
        let link = item.link.as_deref().unwrap_or_default().trim().to_string();
        if title.is_empty() || link.is_empty() {
            continue;
        }
        let summary = clean_summary(
            item.description
                .as_deref()
                .or(item.content_encoded.as_deref())
                .unwrap_or_default(),
        );

        out.push(FeedItem {
            raw_image: item_image(item),
            title,
            link,
            summary,
            published_at: item
                .pub_date
                .as_deref()
                .and_then(parse_rfc2822)
                .unwrap_or_else(Utc::now),
            source_name: source_name.to_string(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("crawl_parse_ms").record(ms);
    counter!("crawl_items_total").increment(out.len() as u64);

    Ok(out)
}

/// Fetches one feed URL over HTTP and parses it.
pub struct RssFeedProvider {
    source_name: String,
    feed_url: String,
    http: reqwest::Client,
}

impl RssFeedProvider {
    pub fn new(http: reqwest::Client, source_name: &str, feed_url: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            feed_url: feed_url.to_string(),
            http,
        }
    }

}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_items(&self) -> Result<Vec<FeedItem>> {
        tracing::info!(source = %self.source_name, url = %self.feed_url, "fetching feed");
        let resp = self
            .http
            .get(&self.feed_url)
            .timeout(FEED_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("fetching {}", self.feed_url))?
            .error_for_status()
            .with_context(|| format!("fetching {}", self.feed_url))?;
        let body = resp.text().await.context("reading feed body")?;
        parse_rss(&self.source_name, &body)
    }

    fn name(&self) -> &str {
        &self.source_name
    }
}
