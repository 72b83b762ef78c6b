//! # 5 Min Case
//!
//! A content-aggregation pipeline for a swipe-card legal reader: it scrapes
//! court judgments and legal-news RSS feeds, normalizes everything into one
//! canonical record shape, deduplicates, persists records to a hosted
//! document store, and emits the derived JSON views the UI consumes.
//!
//! ## Pipeline
//!
//! Each subcommand is one stage, run independently by the scheduler:
//!
//! 1. **scrape**: judgment RSS feeds + CourtListener into the day's raw batch
//! 2. **kanoon**: Indian Kanoon search API straight into the document store
//! 3. **news**: legal-news feeds, deduplicated, published as day files
//! 4. **summarize**: LLM summaries over the raw batch (mock without a key)
//! 5. **build-index**: day / search / trending / today views for the UI
//! 6. **clean**: retention sweep over the stored records
//!
//! ## Resilience
//!
//! Everything recovers at the smallest unit of failure: a dead feed yields
//! an empty batch, a malformed record is dropped, a duplicate write counts
//! as success, and a failed delete is skipped. The only fatal paths are a
//! missing required credential and the orchestration itself failing, which
//! exit non-zero.

use chrono::{Duration, Utc};
use clap::Parser;
use std::error::Error;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod dedupe;
mod models;
mod normalize;
mod outputs;
mod scrapers;
mod store;
mod summarize;
mod utils;

use cli::{Cli, Command};
use dedupe::{dedupe_by_url, dedupe_news};
use models::NewsData;
use outputs::{indexes, json};
use store::DocumentStore;
use summarize::{Provider, process_case};
use utils::ensure_writable_dir;

/// News items kept per day file.
const NEWS_DAY_CAP: usize = 50;

/// Flat delay between per-case summarization calls.
const SUMMARY_DELAY: std::time::Duration = std::time::Duration::from_secs(1);

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("five_min_case starting up");

    let args = Cli::parse();

    let result = match args.command {
        Command::Scrape => run_scrape(&args).await,
        Command::News => run_news(&args).await,
        Command::Kanoon => run_kanoon(&args).await,
        Command::Summarize => run_summarize(&args).await,
        Command::BuildIndex => indexes::build_all(&args.data_dir, &args.public_dir, Utc::now()).await,
        Command::Clean => run_clean(&args).await,
        Command::BackfillPerms => run_backfill(&args).await,
    };

    if let Err(e) = result {
        error!(error = %e, "Run failed");
        return Err(e);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

/// Scrape every configured judgment source, in order, into the day's raw
/// batch file. A failed source contributes nothing; the batch is merged
/// against whatever an earlier run already wrote for the day.
#[instrument(level = "info", skip_all)]
async fn run_scrape(args: &Cli) -> Result<(), Box<dyn Error>> {
    ensure_writable_dir(&args.data_dir).await?;
    let http = reqwest::Client::new();

    let mut all_cases = Vec::new();
    for descriptor in scrapers::case_sources() {
        let cases = scrapers::fetch_cases(
            &http,
            &descriptor,
            args.courtlistener_api_key.as_deref(),
        )
        .await;
        info!(source = descriptor.name(), count = cases.len(), "Source scraped");
        all_cases.extend(cases);
    }
    info!(count = all_cases.len(), "Scraped all judgment sources");

    if all_cases.is_empty() {
        info!("No cases scraped this run");
        return Ok(());
    }

    let today = Utc::now().date_naive().to_string();
    let (new, total) = json::merge_raw_cases(&args.data_dir, &today, all_cases).await?;
    info!(new, total, "Raw batch saved");
    Ok(())
}

/// Scrape the legal-news feeds, dedupe by normalized title (newest copy
/// wins), publish the day files, and persist to the store when configured.
#[instrument(level = "info", skip_all)]
async fn run_news(args: &Cli) -> Result<(), Box<dyn Error>> {
    ensure_writable_dir(&args.data_dir).await?;
    ensure_writable_dir(&args.public_dir).await?;
    let http = reqwest::Client::new();

    let items = scrapers::news::fetch_all(&http).await;
    let unique = dedupe_news(items);
    info!(count = unique.len(), "Deduplicated news batch");

    let now = Utc::now();
    let news_data = NewsData {
        date: normalize::to_iso(now),
        count: unique.len(),
        news: unique.into_iter().take(NEWS_DAY_CAP).collect(),
    };

    let today = now.date_naive().to_string();
    json::write_news_day_file(&args.data_dir, &today, &news_data).await?;
    json::write_today_news(&args.public_dir, &news_data).await?;

    // The store is optional here: the day files are the primary output and
    // the news collection only feeds the retention sweep.
    match args.store_config() {
        Ok(config) => {
            let store = DocumentStore::new(config.clone());
            let records: Vec<(String, String)> = news_data
                .news
                .iter()
                .map(|item| Ok((item.id.clone(), serde_json::to_string(item)?)))
                .collect::<Result<_, serde_json::Error>>()?;
            store
                .write_records(&config.news_collection, "news", &records)
                .await;
        }
        Err(reason) => {
            warn!(%reason, "Store not configured; skipping news persistence");
        }
    }

    Ok(())
}

/// Pull yesterday's judgments from the Indian Kanoon API, drop the ones
/// whose URL is already stored, and write the rest to the case collection.
#[instrument(level = "info", skip_all)]
async fn run_kanoon(args: &Cli) -> Result<(), Box<dyn Error>> {
    let api_key = args
        .indiankanoon_api_key
        .clone()
        .ok_or("INDIANKANOON_API_KEY is not set")?;
    let config = args.store_config()?;
    let store = DocumentStore::new(config.clone());

    let client = scrapers::kanoon::KanoonClient::new(reqwest::Client::new(), api_key);
    let cases = client.scrape_recent().await;
    info!(count = cases.len(), "Fetched Indian Kanoon cases");

    let existing = store.existing_urls(&config.cases_collection).await?;
    let fresh = dedupe_by_url(cases, &existing);
    info!(count = fresh.len(), "New cases after dedup");

    let records: Vec<(String, String)> = fresh
        .iter()
        .map(|case| Ok((case.id.clone(), serde_json::to_string(case)?)))
        .collect::<Result<_, serde_json::Error>>()?;
    store
        .write_records(&config.cases_collection, "case", &records)
        .await;
    Ok(())
}

/// Summarize the day's raw batch into finished case records. Without a raw
/// batch for today there is nothing to do; per-case model failures fall
/// back to mock summaries inside [`process_case`].
#[instrument(level = "info", skip_all)]
async fn run_summarize(args: &Cli) -> Result<(), Box<dyn Error>> {
    let today = Utc::now().date_naive().to_string();
    let raw = match json::read_raw_cases(&args.data_dir, &today).await {
        Ok(raw) => raw,
        Err(e) => {
            info!(date = %today, error = %e, "No raw cases found for today");
            return Ok(());
        }
    };
    info!(count = raw.len(), "Processing raw cases");

    let provider = Provider::from_api_key(args.gemini_api_key.clone());
    info!(provider = provider.name(), "Summarization provider selected");

    let mut processed = Vec::with_capacity(raw.len());
    for case in raw {
        processed.push(process_case(&provider, case, Utc::now()).await);
        tokio::time::sleep(SUMMARY_DELAY).await;
    }

    json::write_processed_cases(&args.data_dir, &today, &processed).await?;
    info!(count = processed.len(), "Summarization complete");
    Ok(())
}

/// Retention sweep: delete stored news and cases older than the window.
#[instrument(level = "info", skip_all)]
async fn run_clean(args: &Cli) -> Result<(), Box<dyn Error>> {
    let config = args.store_config()?;
    let store = DocumentStore::new(config.clone());
    let cutoff = Utc::now() - Duration::days(args.retention_days);
    info!(retention_days = args.retention_days, cutoff = %cutoff.to_rfc3339(), "Starting cleanup");

    let news_deleted = store
        .sweep_older_than(&config.news_collection, "publishedDate", cutoff)
        .await;
    let cases_deleted = store
        .sweep_older_than(&config.cases_collection, "date", cutoff)
        .await;
    info!(news_deleted, cases_deleted, "Cleanup complete");
    Ok(())
}

/// One-time backfill: ensure stored case documents carry public read and
/// server write permissions.
#[instrument(level = "info", skip_all)]
async fn run_backfill(args: &Cli) -> Result<(), Box<dyn Error>> {
    let config = args.store_config()?;
    let store = DocumentStore::new(config.clone());
    let (processed, updated) = store
        .backfill_permissions(&config.cases_collection)
        .await?;
    info!(processed, updated, "Backfill complete");
    Ok(())
}
