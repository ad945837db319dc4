// src/similarity.rs
//! Near-duplicate detection for headlines: normalization + token-set Jaccard.

use std::collections::HashSet;

use once_cell::sync::OnceCell;
use regex::Regex;

/// Default threshold at or above which two titles count as the same story.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.6;

/// Normalize a title for comparison: lowercase, drop everything but
/// `[a-z0-9 ]`, collapse whitespace, trim.
pub fn normalize_title(s: &str) -> String {
    static RE_NON_ALNUM: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_non_alnum = RE_NON_ALNUM.get_or_init(|| Regex::new(r"[^a-z0-9\s]").unwrap());
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());

    let lower = s.to_lowercase();
    let stripped = re_non_alnum.replace_all(&lower, "");
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Jaccard index of the normalized token sets of `a` and `b`, in `[0, 1]`.
/// Returns 0.0 when either side normalizes to nothing.
pub fn similarity(a: &str, b: &str) -> f32 {
    let na = normalize_title(a);
    let nb = normalize_title(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }

    let sa: HashSet<&str> = na.split_whitespace().collect();
    let sb: HashSet<&str> = nb.split_whitespace().collect();
    let inter = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    if union == 0 {
        0.0
    } else {
        inter as f32 / union as f32
    }
}

/// True iff `title` is a near-duplicate of **any** existing title.
pub fn is_near_duplicate<'a, I>(title: &str, existing: I, threshold: f32) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .any(|e| similarity(title, e) >= threshold)
}
