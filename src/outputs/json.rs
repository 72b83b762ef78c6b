//! Day-partitioned JSON data files.
//!
//! Raw scrape batches land in `data/raw/` keyed by date, merged against any
//! batch already written for that day (dedup by URL, first write wins).
//! Summarized cases and news get `YYYY/MM/DD.json` files, and the news run
//! also refreshes the public "today's news" snapshot the UI reads directly.

use crate::dedupe::dedupe_by_url;
use crate::models::{Case, NewsData};
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

fn raw_file_path(data_dir: &str, date: &str) -> PathBuf {
    Path::new(data_dir).join("raw").join(format!("{}-raw.json", date))
}

/// Split a `YYYY-MM-DD` day into its path components.
fn day_parts(date: &str) -> (String, String, String) {
    let mut parts = date.splitn(3, '-').map(str::to_string);
    (
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}

/// Merge a freshly scraped batch into the day's raw file, deduplicating by
/// URL against what is already there. Returns `(new, total)` counts.
#[instrument(level = "info", skip_all, fields(%date))]
pub async fn merge_raw_cases(
    data_dir: &str,
    date: &str,
    batch: Vec<Case>,
) -> Result<(usize, usize), Box<dyn Error>> {
    let path = raw_file_path(data_dir, date);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let existing: Vec<Case> = match fs::read_to_string(&path).await {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(cases) => cases,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Existing raw file unreadable; starting fresh");
                Vec::new()
            }
        },
        Err(_) => Vec::new(),
    };

    let existing_urls: HashSet<String> = existing.iter().map(|c| c.url.clone()).collect();
    let fresh = dedupe_by_url(batch, &existing_urls);
    let new_count = fresh.len();

    let mut all = existing;
    all.extend(fresh);
    let total = all.len();

    fs::write(&path, serde_json::to_string_pretty(&all)?).await?;
    info!(new = new_count, total, path = %path.display(), "Saved raw cases");
    Ok((new_count, total))
}

/// Read the raw batch for one day, for the summarization step.
pub async fn read_raw_cases(data_dir: &str, date: &str) -> Result<Vec<Case>, Box<dyn Error>> {
    let path = raw_file_path(data_dir, date);
    let content = fs::read_to_string(&path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the day's summarized cases to `data/cases/YYYY/MM/DD.json`.
#[instrument(level = "info", skip_all, fields(%date, count = cases.len()))]
pub async fn write_processed_cases(
    data_dir: &str,
    date: &str,
    cases: &[Case],
) -> Result<(), Box<dyn Error>> {
    let (year, month, day) = day_parts(date);
    let dir = Path::new(data_dir).join("cases").join(year).join(month);
    fs::create_dir_all(&dir).await?;

    let path = dir.join(format!("{}.json", day));
    fs::write(&path, serde_json::to_string_pretty(cases)?).await?;
    info!(path = %path.display(), "Saved processed cases");
    Ok(())
}

/// Write the day's news to `data/news/YYYY/MM/DD.json`.
#[instrument(level = "info", skip_all, fields(%date, count = data.count))]
pub async fn write_news_day_file(
    data_dir: &str,
    date: &str,
    data: &NewsData,
) -> Result<(), Box<dyn Error>> {
    let (year, month, day) = day_parts(date);
    let dir = Path::new(data_dir).join("news").join(year).join(month);
    fs::create_dir_all(&dir).await?;

    let path = dir.join(format!("{}.json", day));
    fs::write(&path, serde_json::to_string_pretty(data)?).await?;
    info!(path = %path.display(), "Saved news day file");
    Ok(())
}

/// Refresh the public "today's news" snapshot.
pub async fn write_today_news(public_dir: &str, data: &NewsData) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(public_dir).await?;
    let path = Path::new(public_dir).join("today-news.json");
    fs::write(&path, serde_json::to_string_pretty(data)?).await?;
    info!(path = %path.display(), "Saved today's news snapshot");
    Ok(())
}
