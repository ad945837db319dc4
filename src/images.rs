// src/images.rs
//! Image URL heuristics shared by the feed crawler and the content fetcher.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Whether a URL plausibly points at an image: raster extension, or one of
/// the path/CDN patterns the supported portals use for article photos.
pub fn is_image_url(url: &str) -> bool {
    static RE_EXT: OnceCell<Regex> = OnceCell::new();
    let re_ext = RE_EXT
        .get_or_init(|| Regex::new(r"(?i)\.(jpg|jpeg|png|webp|gif|svg|avif)(\?.*)?$").unwrap());

    if url.is_empty() {
        return false;
    }
    let lower = url.to_lowercase();
    if re_ext.is_match(&lower) {
        return true;
    }
    if lower.contains("/image/") || lower.contains("/foto/") || lower.contains("/photo/") {
        return true;
    }
    lower.contains("akcdn.detik.net.id")
        || lower.contains("asset.kompas.com")
        || (lower.contains("cdn-") && lower.contains("tribunnews"))
        || lower.contains("img.cnn")
}

/// First `<img src="...">` URL in an HTML fragment, if it looks like an image.
pub fn image_from_html(html: &str) -> Option<String> {
    static RE_IMG: OnceCell<Regex> = OnceCell::new();
    let re_img =
        RE_IMG.get_or_init(|| Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["']"#).unwrap());

    let url = re_img.captures(html)?.get(1)?.as_str();
    is_image_url(url).then(|| url.to_string())
}

/// First image in markdown-ish text: `![alt](url)` syntax first, then a bare
/// image URL.
pub fn image_from_text(text: &str) -> Option<String> {
    static RE_MD: OnceCell<Regex> = OnceCell::new();
    static RE_BARE: OnceCell<Regex> = OnceCell::new();
    let re_md = RE_MD.get_or_init(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap());
    let re_bare = RE_BARE.get_or_init(|| {
        Regex::new(r#"(?i)https?://[^\s"'<>]+\.(?:jpg|jpeg|png|webp|gif)(?:\?[^\s"'<>]*)?"#)
            .unwrap()
    });

    if let Some(caps) = re_md.captures(text) {
        let url = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        if is_image_url(url) {
            return Some(url.to_string());
        }
    }
    re_bare.find(text).map(|m| m.as_str().to_string())
}
