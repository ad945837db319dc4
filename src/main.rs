//! Pipeline binary entrypoint. Boots env + tracing, loads configuration,
//! checks the generative-service credential (fatal when absent), then runs
//! one crawl-dedupe-rewrite-publish cycle.
//!
//! Exit code 0 on a completed run (including "zero candidates found"),
//! exit code 1 on missing credential or unhandled top-level failure.

use std::time::Duration;

use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use wartagen::config::PipelineConfig;
use wartagen::extract::ReaderExtractor;
use wartagen::generate::{GenClient, GroqClient};
use wartagen::{ingest, pipeline};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).compact().init();
}

#[tokio::main]
async fn main() {
    // Load .env in local/dev; no-op in CI/prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = match PipelineConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = ?e, "failed to load configuration");
            std::process::exit(1);
        }
    };

    // Credential check comes before any network activity.
    let gen = match GroqClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "missing generative-service credential");
            std::process::exit(1);
        }
    };
    info!(provider = gen.provider_name(), "generative client ready");

    let http = match reqwest::Client::builder()
        .user_agent("WartagenBot/0.1")
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(30))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build http client");
            std::process::exit(1);
        }
    };

    let providers = ingest::providers_from_config(&cfg, &http);
    let extractor = ReaderExtractor::new(http.clone());

    match pipeline::run(&cfg, &providers, &extractor, &gen).await {
        Ok(report) => {
            info!(
                crawled = report.crawled,
                candidates = report.candidates,
                published = report.published,
                "done"
            );
        }
        Err(e) => {
            error!(error = ?e, "pipeline run failed");
            std::process::exit(1);
        }
    }
}
