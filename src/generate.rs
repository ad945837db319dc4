// src/generate.rs
//! Generative-service client plus the three prompt flows built on it:
//! article rewrite (bounded retries), headline generation, and SEO summary
//! generation. The rewrite is the only hard gate; title and description
//! always produce a usable value via fallbacks.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

const REWRITE_RETRIES: u32 = 1;
const RETRY_BACKOFF: Duration = Duration::from_secs(3);
/// A rewrite shorter than this is treated as a failed attempt.
const MIN_REWRITE_CHARS: usize = 200;

#[async_trait]
pub trait GenClient: Send + Sync {
    /// Submit one user prompt; `None` on any transport or provider failure.
    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Option<String>;
    fn provider_name(&self) -> &'static str;
}

/// OpenAI-compatible chat-completions provider (Groq endpoint).
#[derive(Debug)]
pub struct GroqClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("WartagenBot/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Fails when the credential is absent; the caller treats that as fatal
    /// before any network activity happens.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| anyhow::anyhow!("{ENV_API_KEY} is not set"))?;
        if api_key.trim().is_empty() {
            anyhow::bail!("{ENV_API_KEY} is empty");
        }
        Ok(Self::new(api_key))
    }
}

#[async_trait]
impl GenClient for GroqClient {
    async fn complete(&self, prompt: &str, temperature: f32, max_tokens: u32) -> Option<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_completion_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_completion_tokens: max_tokens,
        };

        let resp = self
            .http
            .post(API_URL)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .ok()?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "generative call failed");
            return None;
        }
        let body: Resp = resp.json().await.ok()?;
        let content = body.choices.first().map(|c| c.message.content.trim())?;
        if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        }
    }

    fn provider_name(&self) -> &'static str {
        "groq"
    }
}

fn head_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn strip_wrapping_quotes(s: &str) -> &str {
    s.trim_matches(|c| c == '"' || c == '\'')
}

fn rewrite_prompt(title: &str, source_text: &str, source_name: &str) -> String {
    format!(
        r#"Kamu adalah jurnalis senior portal berita Indonesia.
Tugasmu: tulis ulang berita berikut menjadi artikel BARU yang sepenuhnya original.

ATURAN KETAT:
1. Parafrase TOTAL — tidak boleh ada kalimat yang sama persis dengan sumber
2. Gaya bahasa netral, formal tapi mudah dipahami (seperti portal berita Indonesia)
3. Panjang artikel: 600-800 kata
4. Tambahkan sudut pandang dampak untuk Indonesia jika relevan
5. Struktur: paragraf pembuka yang kuat, lalu beberapa subjudul (## Heading), dan penutup
6. Jangan gunakan frontmatter/metadata, langsung tulis konten artikelnya saja
7. JANGAN tulis "Sumber:" atau "Referensi:" di dalam artikel
8. Gunakan Bahasa Indonesia baku yang baik dan benar

BERITA SUMBER ({source_name}):
Judul: {title}

Konten:
{source_text}

Tulis artikelnya sekarang:"#
    )
}

/// Fully reworded article body, or `None` after all attempts fail or come
/// back unacceptably short. Never errors past this boundary.
pub async fn rewrite_article(
    gen: &dyn GenClient,
    title: &str,
    source_text: &str,
    source_name: &str,
) -> Option<String> {
    let prompt = rewrite_prompt(title, source_text, source_name);

    for attempt in 0..=REWRITE_RETRIES {
        match gen.complete(&prompt, 0.7, 1024).await {
            Some(text) if text.chars().count() > MIN_REWRITE_CHARS => return Some(text),
            Some(_) => {
                tracing::warn!(attempt, title, "rewrite too short, retrying");
            }
            None => {
                tracing::warn!(attempt, title, "rewrite call failed");
            }
        }
        if attempt < REWRITE_RETRIES {
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }
    None
}

/// New headline for the rewritten body; falls back to the source title on
/// failure or an out-of-range result.
pub async fn generate_title(gen: &dyn GenClient, source_title: &str, body: &str) -> String {
    let prompt = format!(
        r#"Buat judul berita baru yang menarik dan berbeda dari judul asli. Aturan:
- Berbeda dari judul asli tapi tetap akurat dengan isi artikel
- Menarik dan informatif (bukan clickbait menipu)
- Bahasa Indonesia, 8-15 kata
- Tanpa tanda kutip di awal/akhir

Judul asli: {source_title}
Isi singkat: {body_head}

Tulis HANYA judul baru (1 baris saja):"#,
        body_head = head_chars(body, 300),
    );

    if let Some(title) = gen.complete(&prompt, 0.8, 80).await {
        let n = title.chars().count();
        if n > 10 && n < 150 {
            return strip_wrapping_quotes(&title).to_string();
        }
        tracing::warn!(chars = n, "generated title out of range, keeping source title");
    }
    source_title.to_string()
}

/// 1–2 sentence SEO summary; falls back to the body's opening text.
pub async fn generate_description(gen: &dyn GenClient, title: &str, body: &str) -> String {
    let prompt = format!(
        r#"Buat deskripsi/ringkasan singkat (1-2 kalimat, maksimal 160 karakter) untuk artikel berita ini.
Harus informatif dan menarik untuk SEO. Bahasa Indonesia.

Judul: {title}
Isi: {body_head}

Tulis HANYA deskripsi (1-2 kalimat, tanpa tanda kutip):"#,
        body_head = head_chars(body, 500),
    );

    if let Some(desc) = gen.complete(&prompt, 0.5, 80).await {
        if desc.chars().count() > 20 {
            return strip_wrapping_quotes(&desc).to_string();
        }
        tracing::warn!("generated description too short, using body fallback");
    }
    fallback_description(body)
}

/// Opening of the body with heading lines removed, cut to ~155 chars.
pub fn fallback_description(body: &str) -> String {
    let flat = body
        .lines()
        .filter(|l| !l.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ");
    let squeezed = flat.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{}...", head_chars(&squeezed, 155).trim_end())
}
