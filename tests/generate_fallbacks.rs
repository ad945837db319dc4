// tests/generate_fallbacks.rs
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use wartagen::generate::{self, GenClient};

/// Returns scripted responses in order; `None` entries simulate failures.
struct ScriptedGen {
    responses: Vec<Option<String>>,
    calls: AtomicUsize,
}

impl ScriptedGen {
    fn new(responses: Vec<Option<String>>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenClient for ScriptedGen {
    async fn complete(&self, _prompt: &str, _temperature: f32, _max_tokens: u32) -> Option<String> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses.get(i).cloned().flatten()
    }
    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

fn long_body() -> String {
    "Kalimat isi artikel yang cukup panjang untuk lolos ambang batas. ".repeat(10)
}

#[tokio::test(start_paused = true)]
async fn rewrite_retries_once_then_gives_up() {
    let gen = ScriptedGen::new(vec![None, None]);
    let out = generate::rewrite_article(&gen, "Judul", "Konten sumber", "Detik").await;
    assert!(out.is_none());
    assert_eq!(gen.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn rewrite_retries_after_short_response_and_succeeds() {
    let gen = ScriptedGen::new(vec![Some("pendek".to_string()), Some(long_body())]);
    let out = generate::rewrite_article(&gen, "Judul", "Konten sumber", "Detik").await;
    assert_eq!(out.unwrap(), long_body());
    assert_eq!(gen.calls(), 2);
}

#[tokio::test]
async fn title_falls_back_to_source_on_failure() {
    let gen = ScriptedGen::new(vec![None]);
    let title = generate::generate_title(&gen, "Judul Asli Dari Sumber", "isi artikel").await;
    assert_eq!(title, "Judul Asli Dari Sumber");
}

#[tokio::test]
async fn title_falls_back_on_out_of_range_result() {
    let gen = ScriptedGen::new(vec![Some("Pendek".to_string())]);
    let title = generate::generate_title(&gen, "Judul Asli Dari Sumber", "isi artikel").await;
    assert_eq!(title, "Judul Asli Dari Sumber");
}

#[tokio::test]
async fn title_strips_wrapping_quotes() {
    let gen = ScriptedGen::new(vec![Some("\"Judul Baru Hasil Generasi Model\"".to_string())]);
    let title = generate::generate_title(&gen, "Judul Asli", "isi artikel").await;
    assert_eq!(title, "Judul Baru Hasil Generasi Model");
}

#[tokio::test]
async fn description_accepts_non_trivial_result() {
    let gen = ScriptedGen::new(vec![Some(
        "Ringkasan artikel yang informatif dan menarik.".to_string(),
    )]);
    let desc = generate::generate_description(&gen, "Judul", &long_body()).await;
    assert_eq!(desc, "Ringkasan artikel yang informatif dan menarik.");
}

#[tokio::test]
async fn description_falls_back_to_body_head() {
    let gen = ScriptedGen::new(vec![None]);
    let body = format!("## Subjudul\n{}", long_body());
    let desc = generate::generate_description(&gen, "Judul", &body).await;
    assert!(desc.starts_with("Kalimat isi artikel"));
    assert!(desc.ends_with("..."));
}
