// src/pipeline.rs
//! One full run: crawl → score → dedupe → per-candidate
//! fetch / rewrite / title / description / tags / persist, with courtesy
//! delays between external calls. No failure from one candidate's processing
//! may abort the run for the others.

use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use rand::Rng;

use crate::config::PipelineConfig;
use crate::dedup::{self, Candidate};
use crate::extract::ContentExtractor;
use crate::generate::{self, GenClient};
use crate::history::HistoryStore;
use crate::hotness::HotnessScorer;
use crate::ingest::{self, types::FeedProvider};
use crate::publish;
use crate::tags;

const INTER_CALL_DELAY: Duration = Duration::from_millis(500);
const INTER_ARTICLE_DELAY: Duration = Duration::from_millis(1000);
/// Extracted text shorter than this falls back to the feed summary.
const MIN_EXTRACTED_CHARS: usize = 100;
/// Source text shorter than this skips the candidate outright.
const MIN_SOURCE_CHARS: usize = 50;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("articles_published_total", "Documents written this process.");
        describe_counter!(
            "candidates_skipped_total",
            "Candidates dropped by a pipeline stage."
        );
        describe_counter!("dedup_rejected_total", "Items rejected during deduplication.");
        describe_gauge!("pipeline_last_run_ts", "Unix ts when a run last finished.");
    });
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub crawled: usize,
    pub candidates: usize,
    pub target: usize,
    pub published: usize,
}

/// Drive one run against the given providers and service clients. The
/// credential check happens before this is called; everything past that
/// boundary degrades per candidate instead of failing the run.
pub async fn run(
    cfg: &PipelineConfig,
    providers: &[Box<dyn FeedProvider>],
    extractor: &dyn ContentExtractor,
    gen: &dyn GenClient,
) -> Result<RunReport> {
    ensure_metrics_described();

    fs::create_dir_all(&cfg.paths.blog_dir)
        .with_context(|| format!("creating {}", cfg.paths.blog_dir.display()))?;

    let mut history = HistoryStore::load(&cfg.paths.history_file, cfg.limits.max_history);
    history.reconcile_with_corpus(&cfg.paths.blog_dir);

    let window = chrono::Duration::hours(cfg.limits.window_hours);
    let items = ingest::crawl(providers, window).await;
    let crawled = items.len();
    tracing::info!(crawled, window_hours = cfg.limits.window_hours, "crawl complete");

    let scorer = HotnessScorer::new(&cfg.hotness.keywords);
    let candidates = dedup::select_candidates(
        items,
        &scorer,
        &history,
        &cfg.paths.blog_dir,
        &cfg.limits,
    );
    tracing::info!(candidates = candidates.len(), "dedup complete");

    let mut report = RunReport {
        crawled,
        candidates: candidates.len(),
        ..Default::default()
    };
    if candidates.is_empty() {
        tracing::info!("no new candidates this run");
        return Ok(report);
    }

    report.target = rand::rng().random_range(cfg.limits.min_articles..=cfg.limits.max_articles);
    tracing::info!(
        target = report.target,
        min = cfg.limits.min_articles,
        max = cfg.limits.max_articles,
        "target article count"
    );

    for cand in &candidates {
        if report.published >= report.target {
            break;
        }
        match process_candidate(cfg, &mut history, extractor, gen, cand).await {
            Ok(true) => {
                report.published += 1;
                counter!("articles_published_total").increment(1);
                tokio::time::sleep(INTER_ARTICLE_DELAY).await;
            }
            Ok(false) => {
                counter!("candidates_skipped_total").increment(1);
            }
            Err(e) => {
                tracing::error!(title = %cand.item.title, error = ?e, "candidate failed, continuing");
                counter!("candidates_skipped_total").increment(1);
            }
        }
    }

    gauge!("pipeline_last_run_ts").set(Utc::now().timestamp() as f64);
    tracing::info!(published = report.published, "run finished");
    Ok(report)
}

async fn process_candidate(
    cfg: &PipelineConfig,
    history: &mut HistoryStore,
    extractor: &dyn ContentExtractor,
    gen: &dyn GenClient,
    cand: &Candidate,
) -> Result<bool> {
    tracing::info!(
        title = %cand.item.title,
        source = %cand.item.source_name,
        score = cand.hotness_score,
        "processing candidate"
    );

    let extracted = extractor.extract(&cand.item.link).await;

    let mut text = extracted.text.unwrap_or_default();
    if text.chars().count() < MIN_EXTRACTED_CHARS {
        tracing::info!("extraction thin, falling back to feed summary");
        text = cand.item.summary.clone();
    }
    if text.chars().count() < MIN_SOURCE_CHARS {
        tracing::info!("skip: source text too short");
        return Ok(false);
    }

    let Some(body) =
        generate::rewrite_article(gen, &cand.item.title, &text, &cand.item.source_name).await
    else {
        tracing::info!("skip: rewrite failed");
        return Ok(false);
    };

    tokio::time::sleep(INTER_CALL_DELAY).await;
    let title = generate::generate_title(gen, &cand.item.title, &body).await;
    tokio::time::sleep(INTER_CALL_DELAY).await;
    let description = generate::generate_description(gen, &title, &body).await;
    tokio::time::sleep(INTER_CALL_DELAY).await;

    let tag_list = tags::detect_tags(&cfg.categories, &title, &body);
    // Feed image wins over one scraped out of the extracted text.
    let image = cand.item.raw_image.as_deref().or(extracted.image.as_deref());

    let slug = publish::persist(
        &cfg.paths.blog_dir,
        history,
        cand,
        &title,
        &description,
        &tag_list,
        &body,
        image,
        cfg.limits.min_slug_len,
    )?;
    Ok(slug.is_some())
}
