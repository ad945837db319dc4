// tests/history_store.rs
use chrono::{Duration, Utc};
use wartagen::history::{HistoryEntry, HistoryStore};

fn entry(slug: &str, url: &str, produced_at: &str) -> HistoryEntry {
    HistoryEntry {
        slug: slug.to_string(),
        title: format!("Judul {slug}"),
        source_title: format!("Sumber {slug}"),
        source_url: url.to_string(),
        source_name: "Detik".to_string(),
        produced_at: produced_at.to_string(),
    }
}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[test]
fn append_then_load_round_trips() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.json");

    let mut store = HistoryStore::load(&path, 500);
    assert!(store.is_empty());
    store
        .append(entry("berita-satu", "https://a.id/1", &today()))
        .unwrap();

    let reloaded = HistoryStore::load(&path, 500);
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.contains_slug("berita-satu"));
    assert_eq!(reloaded.entries()[0].source_name, "Detik");
}

#[test]
fn cap_evicts_oldest_first() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.json");

    let mut store = HistoryStore::load(&path, 3);
    for i in 0..5 {
        store
            .append(entry(&format!("slug-{i}"), &format!("https://a.id/{i}"), &today()))
            .unwrap();
    }

    assert_eq!(store.len(), 3);
    assert!(!store.contains_slug("slug-0"));
    assert!(!store.contains_slug("slug-1"));
    assert!(store.contains_slug("slug-4"));

    let reloaded = HistoryStore::load(&path, 3);
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn malformed_file_loads_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.json");
    std::fs::write(&path, "tidak ada json di sini {").unwrap();

    let store = HistoryStore::load(&path, 500);
    assert!(store.is_empty());
}

#[test]
fn urls_seen_within_respects_the_window() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("history.json");

    let yesterday = (Utc::now() - Duration::days(1)).format("%Y-%m-%d").to_string();
    let last_week = (Utc::now() - Duration::days(7)).format("%Y-%m-%d").to_string();

    let mut store = HistoryStore::load(&path, 500);
    store.append(entry("baru", "https://a.id/baru", &yesterday)).unwrap();
    store.append(entry("lama", "https://a.id/lama", &last_week)).unwrap();

    let recent = store.urls_seen_within(2);
    assert!(recent.contains("https://a.id/baru"));
    assert!(!recent.contains("https://a.id/lama"));
}

#[test]
fn rebuild_reconciles_store_with_corpus() {
    let tmp = tempfile::tempdir().unwrap();
    let blog_dir = tmp.path().join("blog");
    std::fs::create_dir_all(&blog_dir).unwrap();
    let path = tmp.path().join("history.json");

    std::fs::write(
        blog_dir.join("proyek-strategis-diresmikan.mdx"),
        "---\ntitle: \"Proyek Strategis Diresmikan\"\ndate: \"2026-08-01\"\ntime: \"07:30\"\ndescription: \"Ringkas\"\ntags: [\"politik\"]\n---\n\nIsi artikel.\n\n---\n\n*Sumber referensi: [Detik](https://news.detik.com/berita/d-1)*\n",
    )
    .unwrap();
    std::fs::write(
        blog_dir.join("harga-emas-naik.mdx"),
        "---\ntitle: \"Harga \\\"Emas\\\" Naik\"\ndate: \"2026-08-02\"\ntime: \"08:00\"\ndescription: \"Ringkas\"\ntags: [\"ekonomi\"]\n---\n\nIsi artikel.\n\n---\n\n*Sumber referensi: [Tempo](https://rss.tempo.co/x)*\n",
    )
    .unwrap();
    // Not a document; must be ignored.
    std::fs::write(blog_dir.join("catatan.txt"), "bukan artikel").unwrap();

    let mut store = HistoryStore::load(&path, 500);
    store.reconcile_with_corpus(&blog_dir);

    assert_eq!(store.len(), 2);
    assert!(store.contains_slug("proyek-strategis-diresmikan"));
    assert!(store.contains_slug("harga-emas-naik"));
    let emas = store
        .entries()
        .iter()
        .find(|e| e.slug == "harga-emas-naik")
        .unwrap();
    assert_eq!(emas.title, "Harga \"Emas\" Naik");
    assert_eq!(emas.source_url, "https://rss.tempo.co/x");
    assert_eq!(emas.source_name, "Tempo");

    // The merged result is persisted immediately.
    let reloaded = HistoryStore::load(&path, 500);
    assert_eq!(reloaded.len(), 2);
}

#[test]
fn rebuild_keeps_loaded_entries_and_dedupes_by_slug() {
    let tmp = tempfile::tempdir().unwrap();
    let blog_dir = tmp.path().join("blog");
    std::fs::create_dir_all(&blog_dir).unwrap();
    let path = tmp.path().join("history.json");

    std::fs::write(
        blog_dir.join("sudah-ada.mdx"),
        "---\ntitle: \"Versi Dari Corpus\"\ndate: \"2026-08-03\"\ntime: \"09:00\"\ndescription: \"x\"\ntags: [\"berita\"]\n---\n\nIsi.\n\n---\n\n*Sumber referensi: [Detik](https://a.id/s)*\n",
    )
    .unwrap();

    let mut store = HistoryStore::load(&path, 500);
    store.append(entry("sudah-ada", "https://a.id/s", &today())).unwrap();
    store.append(entry("hanya-di-history", "https://a.id/h", &today())).unwrap();
    store.reconcile_with_corpus(&blog_dir);

    assert_eq!(store.len(), 2);
    // Corpus scan ran after the loaded entries, so it wins for the shared slug.
    let shared = store
        .entries()
        .iter()
        .find(|e| e.slug == "sudah-ada")
        .unwrap();
    assert_eq!(shared.title, "Versi Dari Corpus");
    assert!(store.contains_slug("hanya-di-history"));
}
