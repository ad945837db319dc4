// src/config.rs
//! Pipeline configuration: feed portals, keyword tables, category map, and
//! run limits. Loaded from TOML with an env-var path override; the default
//! config ships compiled in so the binary runs without a config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/pipeline.toml";
const EMBEDDED_DEFAULT: &str = include_str!("../config/pipeline.toml");

fn default_min_articles() -> usize {
    4
}
fn default_max_articles() -> usize {
    6
}
fn default_window_hours() -> i64 {
    4
}
fn default_similarity_threshold() -> f32 {
    0.6
}
fn default_url_recency_days() -> i64 {
    2
}
fn default_max_history() -> usize {
    500
}
fn default_min_slug_len() -> usize {
    5
}
fn default_term_weight() -> u32 {
    2
}
fn default_blog_dir() -> PathBuf {
    PathBuf::from("blog")
}
fn default_history_file() -> PathBuf {
    PathBuf::from("history.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub portals: Vec<Portal>,
    #[serde(default)]
    pub hotness: HotnessCfg,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Limits {
    #[serde(default = "default_min_articles")]
    pub min_articles: usize,
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
    #[serde(default = "default_url_recency_days")]
    pub url_recency_days: i64,
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    #[serde(default = "default_min_slug_len")]
    pub min_slug_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_articles: default_min_articles(),
            max_articles: default_max_articles(),
            window_hours: default_window_hours(),
            similarity_threshold: default_similarity_threshold(),
            url_recency_days: default_url_recency_days(),
            max_history: default_max_history(),
            min_slug_len: default_min_slug_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    #[serde(default = "default_blog_dir")]
    pub blog_dir: PathBuf,
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            blog_dir: default_blog_dir(),
            history_file: default_history_file(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Portal {
    pub name: String,
    pub feeds: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotnessCfg {
    #[serde(default)]
    pub keywords: Vec<WeightedTerm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    #[serde(default = "default_term_weight")]
    pub weight: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
}

impl PipelineConfig {
    /// Resolve and load configuration:
    /// 1) `$PIPELINE_CONFIG_PATH` (hard error if unreadable)
    /// 2) `config/pipeline.toml` if present
    /// 3) the embedded default
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            return Self::from_path(Path::new(&p));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::from_path(&default);
        }
        Self::from_toml_str(EMBEDDED_DEFAULT).context("parsing embedded default config")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config from {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: PipelineConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        let l = &mut self.limits;
        if l.min_articles > l.max_articles {
            std::mem::swap(&mut l.min_articles, &mut l.max_articles);
        }
        if !(0.0..=1.0).contains(&l.similarity_threshold) {
            l.similarity_threshold = default_similarity_threshold();
        }
    }
}
