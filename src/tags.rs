// src/tags.rs
//! Local topic tagging: score the configured category map by keyword hits
//! against title + body, take the top two categories, cap at four tags.
//! No external calls.

use crate::config::Category;

/// Fallback pair when no category matches at all.
pub const DEFAULT_TAGS: [&str; 2] = ["berita", "terkini"];

pub fn detect_tags(categories: &[Category], title: &str, body: &str) -> Vec<String> {
    let text = format!("{title} {body}").to_lowercase();

    let mut matched: Vec<(&Category, usize)> = categories
        .iter()
        .map(|cat| {
            let hits = cat
                .keywords
                .iter()
                .filter(|kw| text.contains(kw.to_lowercase().as_str()))
                .count();
            (cat, hits)
        })
        .filter(|(_, hits)| *hits >= 1)
        .collect();

    // Stable sort keeps config order between equally-scored categories.
    matched.sort_by(|a, b| b.1.cmp(&a.1));

    let mut tags: Vec<String> = Vec::new();
    for (cat, _) in matched.iter().take(2) {
        for tag in &cat.tags {
            if !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
    }

    if tags.is_empty() {
        return DEFAULT_TAGS.iter().map(|s| s.to_string()).collect();
    }
    tags.truncate(4);
    tags
}
