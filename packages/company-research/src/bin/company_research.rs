//! Command-line entry point: research one company domain and print or
//! write the combined JSON.

use anyhow::{Context, Result};
use clap::Parser;
use company_research::{
    CompanyResearchPipeline, FileCacheStore, GeminiModel, HttpFetcher, PipelineConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "company-research")]
#[command(about = "Crawl a company website and research it from third-party sources")]
struct Cli {
    /// Company domain, e.g. example.com
    domain: String,

    /// Ignore cached artifacts (results are still written back)
    #[arg(long)]
    bypass_cache: bool,

    /// Stop after the crawl
    #[arg(long)]
    crawl_only: bool,

    /// Cache directory (overrides COMPANY_RESEARCH_CACHE_DIR)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Write JSON here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,company_research=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env().context("Failed to load configuration")?;
    if let Some(dir) = cli.cache_dir {
        config = config.with_cache_dir(dir);
    }
    if !config.credentials.is_configured() {
        tracing::warn!("GEMINI_API_KEY not set: link selection falls back and research is skipped");
    }

    let fetcher = HttpFetcher::new()
        .context("Failed to create HTTP client")?
        .with_user_agent(&config.crawl.user_agent);
    let pipeline = CompanyResearchPipeline::new(
        Arc::new(fetcher),
        Arc::new(GeminiModel::new(&config.credentials)),
        Arc::new(FileCacheStore::new(&config.cache_dir)),
        config.crawl.clone(),
        config.research.clone(),
    );

    let json = if cli.crawl_only {
        let crawl = pipeline.crawl(&cli.domain, cli.bypass_cache).await;
        serde_json::to_string_pretty(&crawl)?
    } else {
        let output = pipeline.run(&cli.domain, cli.bypass_cache).await;
        serde_json::to_string_pretty(&output)?
    };

    match cli.output {
        Some(path) => {
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Output written");
        }
        None => println!("{}", json),
    }

    Ok(())
}
