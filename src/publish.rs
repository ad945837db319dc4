// src/publish.rs
//! Final document writer: one MDX file per article with a frontmatter header
//! and a trailing attribution line, plus the matching history append.
//! Documents are immutable once written; a slug collision rejects the
//! candidate instead of overwriting.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};

use crate::dedup::Candidate;
use crate::history::{HistoryEntry, HistoryStore};
use crate::slug::slugify;

/// Document dates and times are WIB (UTC+7) wall-clock.
fn wib_now() -> DateTime<FixedOffset> {
    let wib = FixedOffset::east_opt(7 * 3600).expect("valid WIB offset");
    Utc::now().with_timezone(&wib)
}

pub fn today_date() -> String {
    wib_now().format("%Y-%m-%d").to_string()
}

pub fn current_time() -> String {
    wib_now().format("%H:%M").to_string()
}

pub fn document_path(blog_dir: &Path, slug: &str) -> PathBuf {
    blog_dir.join(format!("{slug}.mdx"))
}

pub fn document_exists(blog_dir: &Path, slug: &str) -> bool {
    document_path(blog_dir, slug).exists()
}

fn escape_quotes(s: &str) -> String {
    s.replace('"', "\\\"")
}

pub struct DocumentMeta<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub image: Option<&'a str>,
    pub body: &'a str,
    pub source_name: &'a str,
    pub source_url: &'a str,
}

pub fn render_document(meta: &DocumentMeta<'_>, date: &str, time: &str) -> String {
    let image_line = meta
        .image
        .map(|url| format!("\nimage: \"{url}\""))
        .unwrap_or_default();
    let tags_json = serde_json::to_string(meta.tags).unwrap_or_else(|_| "[]".to_string());

    format!(
        "---\ntitle: \"{title}\"\ndate: \"{date}\"\ntime: \"{time}\"\ndescription: \"{description}\"\ntags: {tags_json}{image_line}\n---\n\n{body}\n\n---\n\n*Sumber referensi: [{source_name}]({source_url})*\n",
        title = escape_quotes(meta.title),
        description = escape_quotes(meta.description),
        body = meta.body,
        source_name = meta.source_name,
        source_url = meta.source_url,
    )
}

/// Write the document and append the matching history entry. Returns the
/// final slug, or `None` when the slug is invalid or already taken (the
/// candidate is rejected, nothing is written). The two writes are not
/// transactional; a crash between them is the one tolerated inconsistency.
#[allow(clippy::too_many_arguments)]
pub fn persist(
    blog_dir: &Path,
    history: &mut HistoryStore,
    candidate: &Candidate,
    title: &str,
    description: &str,
    tags: &[String],
    body: &str,
    image: Option<&str>,
    min_slug_len: usize,
) -> Result<Option<String>> {
    let slug = slugify(title);
    if slug.len() < min_slug_len || document_exists(blog_dir, &slug) {
        tracing::info!(%slug, "skip: slug invalid or already published");
        return Ok(None);
    }

    let date = today_date();
    let time = current_time();
    let rendered = render_document(
        &DocumentMeta {
            title,
            description,
            tags,
            image,
            body,
            source_name: &candidate.item.source_name,
            source_url: &candidate.item.link,
        },
        &date,
        &time,
    );

    fs::create_dir_all(blog_dir)
        .with_context(|| format!("creating {}", blog_dir.display()))?;
    let path = document_path(blog_dir, &slug);
    fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "document written");

    history.append(HistoryEntry {
        slug: slug.clone(),
        title: title.to_string(),
        source_title: candidate.item.title.clone(),
        source_url: candidate.item.link.clone(),
        source_name: candidate.item.source_name.clone(),
        produced_at: date,
    })?;

    Ok(Some(slug))
}
