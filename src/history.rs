// src/history.rs
//! Durable, size-capped log of previously published documents. This is the
//! cross-run half of deduplication: one entry per published document, kept in
//! a single JSON array file that is rewritten wholesale after every append.
//!
//! The store is loaded once per run and threaded through the deduplicator and
//! persister as an explicit value. Single writer is assumed; see DESIGN.md.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default cap on stored entries; oldest (by insertion) are evicted first.
pub const DEFAULT_HISTORY_CAP: usize = 500;

/// Below this many loaded entries the store is considered fresh or lost and
/// gets rebuilt from the document corpus.
pub const REBUILD_MIN_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub slug: String,
    /// Published (generated) title.
    pub title: String,
    #[serde(rename = "sourceTitle")]
    pub source_title: String,
    #[serde(rename = "sourceUrl")]
    pub source_url: String,
    #[serde(rename = "portal")]
    pub source_name: String,
    /// Production date, `YYYY-MM-DD`.
    #[serde(rename = "date")]
    pub produced_at: String,
}

#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
    cap: usize,
}

impl HistoryStore {
    /// Load the store from `path`. Absent or malformed files yield an empty
    /// store; a run never fails because of history state.
    pub fn load(path: impl Into<PathBuf>, cap: usize) -> Self {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(v) => {
                    tracing::info!(entries = v.len(), path = %path.display(), "history loaded");
                    v
                }
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "malformed history, starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, entries, cap }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Rebuild from the document corpus when the loaded store looks fresh or
    /// lost (fewer than [`REBUILD_MIN_ENTRIES`] entries). Scans every `.mdx`
    /// document, merges with loaded entries deduplicated by slug
    /// (last-write-wins), and persists the merged result immediately.
    pub fn reconcile_with_corpus(&mut self, blog_dir: &Path) {
        if self.entries.len() >= REBUILD_MIN_ENTRIES {
            return;
        }

        let rebuilt = scan_corpus(blog_dir);
        if rebuilt.is_empty() && self.entries.is_empty() {
            return;
        }
        tracing::info!(rebuilt = rebuilt.len(), "rebuilding history from document corpus");

        let mut by_slug: HashMap<String, usize> = HashMap::new();
        let mut merged: Vec<HistoryEntry> = Vec::with_capacity(self.entries.len() + rebuilt.len());
        for entry in std::mem::take(&mut self.entries).into_iter().chain(rebuilt) {
            match by_slug.get(&entry.slug) {
                Some(&i) => merged[i] = entry,
                None => {
                    by_slug.insert(entry.slug.clone(), merged.len());
                    merged.push(entry);
                }
            }
        }
        self.entries = merged;
        if let Err(e) = self.save() {
            tracing::warn!(error = %e, "failed to persist rebuilt history");
        }
    }

    /// Append one entry and flush the whole store to disk, truncated to the
    /// cap keeping the most recently appended entries. Flushing per append
    /// bounds crash loss to the in-flight candidate.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        self.entries.push(entry);
        if self.entries.len() > self.cap {
            let excess = self.entries.len() - self.cap;
            self.entries.drain(0..excess);
        }
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        // Write-then-rename so a crash mid-write never leaves a torn file.
        let tmp = self.path.with_extension("json.tmp");
        let mut f =
            fs::File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
        f.write_all(json.as_bytes())?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }

    pub fn contains_slug(&self, slug: &str) -> bool {
        self.entries.iter().any(|e| e.slug == slug)
    }

    /// Source URLs of entries produced within the last `days` days.
    pub fn urls_seen_within(&self, days: i64) -> HashSet<&str> {
        let cutoff = (Utc::now() - Duration::days(days)).date_naive();
        self.entries
            .iter()
            .filter(|e| {
                NaiveDate::parse_from_str(&e.produced_at, "%Y-%m-%d")
                    .map(|d| d >= cutoff)
                    .unwrap_or(false)
            })
            .map(|e| e.source_url.as_str())
            .filter(|u| !u.is_empty())
            .collect()
    }

    pub fn all_titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.title.as_str())
    }

    pub fn all_source_titles(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.source_title.as_str())
    }
}

/// Extract history entries from existing documents: slug from the file name,
/// title/date from the frontmatter, source URL from the attribution line.
fn scan_corpus(blog_dir: &Path) -> Vec<HistoryEntry> {
    static RE_TITLE: OnceCell<Regex> = OnceCell::new();
    static RE_DATE: OnceCell<Regex> = OnceCell::new();
    static RE_SOURCE: OnceCell<Regex> = OnceCell::new();
    let re_title = RE_TITLE.get_or_init(|| Regex::new(r#"(?m)^title: "(.+)"$"#).unwrap());
    let re_date = RE_DATE.get_or_init(|| Regex::new(r#"(?m)^date: "(.+)"$"#).unwrap());
    let re_source =
        RE_SOURCE.get_or_init(|| Regex::new(r"\*Sumber referensi: \[(.+?)\]\((.+?)\)\*").unwrap());

    let Ok(dir) = fs::read_dir(blog_dir) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for dent in dir.flatten() {
        let path = dent.path();
        if path.extension().and_then(|e| e.to_str()) != Some("mdx") {
            continue;
        }
        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };

        let title = re_title
            .captures(&content)
            .map(|c| c[1].replace("\\\"", "\""));
        let date = re_date.captures(&content).map(|c| c[1].to_string());
        let source = re_source.captures(&content);

        if let (Some(title), Some(date)) = (title, date) {
            out.push(HistoryEntry {
                slug: slug.to_string(),
                source_title: title.clone(),
                title,
                source_url: source
                    .as_ref()
                    .map(|c| c[2].to_string())
                    .unwrap_or_default(),
                source_name: source.map(|c| c[1].to_string()).unwrap_or_default(),
                produced_at: date,
            });
        }
    }
    out
}
