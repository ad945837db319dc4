// src/slug.rs
//! URL-safe slugs derived from titles. The slug is the primary key for both
//! documents and history entries.

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 80;

/// Slugify a title: lowercase, keep `[a-z0-9-]`, whitespace becomes `-`,
/// runs of `-` collapse, capped at [`MAX_SLUG_LEN`].
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut prev_dash = false;
    for c in lower.chars() {
        let mapped = match c {
            'a'..='z' | '0'..='9' => Some(c),
            '-' => Some('-'),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        };
        match mapped {
            Some('-') => {
                if !prev_dash && !out.is_empty() {
                    out.push('-');
                }
                prev_dash = true;
            }
            Some(c) => {
                out.push(c);
                prev_dash = false;
            }
            None => {}
        }
    }
    out.truncate(MAX_SLUG_LEN);
    out.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_title() {
        assert_eq!(
            slugify("Presiden Resmikan Proyek Strategis!"),
            "presiden-resmikan-proyek-strategis"
        );
    }

    #[test]
    fn collapses_separators_and_trims() {
        assert_eq!(slugify("  a  --  b  "), "a-b");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn drops_non_ascii() {
        assert_eq!(slugify("Café — menu baru"), "caf-menu-baru");
    }

    #[test]
    fn caps_length() {
        let long = "kata ".repeat(40);
        assert!(slugify(&long).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn idempotent() {
        for t in ["Harga BBM Naik Lagi?", "a -- b", &"panjang sekali ".repeat(20)] {
            let once = slugify(t);
            assert_eq!(slugify(&once), once);
        }
    }
}
