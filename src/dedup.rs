// src/dedup.rs
//! Candidate selection. Items are ordered by `(hotness desc, published desc)`
//! and admitted one at a time; every admission immediately extends the in-run
//! rejection sets, so two near-identical stories from different feeds cannot
//! both pass in a single run.

use std::collections::HashSet;
use std::path::Path;

use metrics::counter;

use crate::config::Limits;
use crate::history::HistoryStore;
use crate::hotness::HotnessScorer;
use crate::ingest::types::FeedItem;
use crate::publish;
use crate::similarity;
use crate::slug::slugify;

#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: FeedItem,
    pub hotness_score: u32,
    /// Normalized-title slug used for duplicate rejection.
    pub dedupe_key: String,
}

/// Admit genuinely novel items, at most `2 × max_articles` of them (a buffer
/// against later pipeline-stage failures), preserving score-descending order.
pub fn select_candidates(
    items: Vec<FeedItem>,
    scorer: &HotnessScorer,
    history: &HistoryStore,
    blog_dir: &Path,
    limits: &Limits,
) -> Vec<Candidate> {
    let max_candidates = limits.max_articles * 2;

    let mut scored: Vec<Candidate> = items
        .into_iter()
        .map(|item| Candidate {
            hotness_score: scorer.score(&item.title),
            dedupe_key: slugify(&item.title),
            item,
        })
        .collect();
    scored.sort_by(|a, b| {
        b.hotness_score
            .cmp(&a.hotness_score)
            .then(b.item.published_at.cmp(&a.item.published_at))
    });

    let recent_urls = history.urls_seen_within(limits.url_recency_days);
    let history_titles: Vec<&str> = history.all_titles().collect();
    let history_source_titles: Vec<&str> = history.all_source_titles().collect();

    let mut seen_slugs: HashSet<String> = HashSet::new();
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: Vec<String> = Vec::new();
    let mut admitted: Vec<Candidate> = Vec::new();

    for cand in scored {
        if admitted.len() >= max_candidates {
            break;
        }
        if cand.dedupe_key.len() < limits.min_slug_len {
            continue;
        }
        if seen_slugs.contains(&cand.dedupe_key)
            || history.contains_slug(&cand.dedupe_key)
            || publish::document_exists(blog_dir, &cand.dedupe_key)
        {
            counter!("dedup_rejected_total").increment(1);
            continue;
        }
        if seen_urls.contains(cand.item.link.as_str())
            || recent_urls.contains(cand.item.link.as_str())
        {
            tracing::info!(title = %cand.item.title, "skip: source url already processed");
            counter!("dedup_rejected_total").increment(1);
            continue;
        }

        let existing = history_titles
            .iter()
            .copied()
            .chain(history_source_titles.iter().copied())
            .chain(seen_titles.iter().map(|s| s.as_str()));
        if similarity::is_near_duplicate(&cand.item.title, existing, limits.similarity_threshold) {
            tracing::info!(title = %cand.item.title, "skip: near-duplicate title");
            counter!("dedup_rejected_total").increment(1);
            continue;
        }

        seen_slugs.insert(cand.dedupe_key.clone());
        seen_urls.insert(cand.item.link.clone());
        seen_titles.push(cand.item.title.clone());
        admitted.push(cand);
    }

    admitted
}
