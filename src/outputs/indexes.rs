//! Derived index views over the full case set.
//!
//! The builder reloads every case file under `data/cases/` and emits four
//! views for static consumption by the UI:
//!
//! - **Day index** (`index.json`): one entry per calendar day, date
//!   descending, with a trimmed projection of its cases
//! - **Search index** (`search-index.json`): a lowercase text blob per case
//!   for substring search, alongside the filterable fields
//! - **Trending** (`trending.json`): the ten most recent cases from the
//!   last seven days — recency standing in for popularity
//! - **Today snapshot** (`public/data/today.json`): full records for the
//!   current day, the first thing the UI loads
//!
//! A single unreadable case file never aborts a build: it is logged and its
//! contents skipped.

use crate::models::{
    Case, CaseIndexCard, CaseIndexEntry, SearchEntry, SearchIndex, TodayData, TrendingCard,
    TrendingData,
};
use crate::normalize::to_iso;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument, warn};

const SEARCH_INDEX_VERSION: &str = "1.0";

/// Days of history the trending view considers.
const TRENDING_WINDOW_DAYS: i64 = 7;

/// Cases kept in the trending view.
const TRENDING_CAP: usize = 10;

/// Load every case from the `data/cases/` tree.
///
/// Walks the day-partitioned directory structure and concatenates each
/// file's case array. Unreadable or unparseable files are logged and
/// skipped.
#[instrument(level = "info", skip_all, fields(%cases_dir))]
pub async fn load_all_cases(cases_dir: &str) -> Vec<Case> {
    let mut cases = Vec::new();
    let mut pending: Vec<PathBuf> = vec![PathBuf::from(cases_dir)];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to scan directory; skipped");
                continue;
            }
        };
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(path = %dir.display(), error = %e, "Directory read failed; skipped");
                    break;
                }
            };
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                match read_case_file(&path).await {
                    Ok(batch) => cases.extend(batch),
                    Err(e) => error!(path = %path.display(), error = %e, "Failed to load case file; skipped"),
                }
            }
        }
    }

    info!(count = cases.len(), "Loaded all cases");
    cases
}

async fn read_case_file(path: &Path) -> Result<Vec<Case>, Box<dyn Error>> {
    let content = fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Group cases into day buckets, newest day first.
pub fn build_day_index(cases: &[Case]) -> Vec<CaseIndexEntry> {
    let mut by_date: BTreeMap<String, Vec<&Case>> = BTreeMap::new();
    for case in cases {
        by_date
            .entry(case.day_bucket().to_string())
            .or_default()
            .push(case);
    }

    by_date
        .into_iter()
        .rev()
        .map(|(date, day_cases)| CaseIndexEntry {
            date,
            count: day_cases.len(),
            cases: day_cases
                .iter()
                .map(|c| CaseIndexCard {
                    id: c.id.clone(),
                    title: c.parties.title.clone(),
                    court: c.court.clone(),
                    tags: c.tags.clone(),
                })
                .collect(),
        })
        .collect()
}

/// The lowercase blob a case is matched against in substring search.
pub fn search_text(case: &Case) -> String {
    [
        case.parties.title.as_str(),
        case.court.as_str(),
        case.tldr60.as_str(),
        &case.tags.join(" "),
        &case.statutes.join(" "),
        case.neutral_citation.as_deref().unwrap_or(""),
        &case.reporter_citations.join(" "),
    ]
    .join(" ")
    .to_lowercase()
}

/// Build the flat search view over every case.
pub fn build_search_index(cases: &[Case], now: DateTime<Utc>) -> SearchIndex {
    SearchIndex {
        version: SEARCH_INDEX_VERSION.to_string(),
        last_updated: to_iso(now),
        cases: cases
            .iter()
            .map(|c| SearchEntry {
                id: c.id.clone(),
                search_text: search_text(c),
                jurisdiction: c.jurisdiction,
                court: c.court.clone(),
                date: c.date.clone(),
                tags: c.tags.clone(),
            })
            .collect(),
    }
}

/// Build the trending view: cases from the last seven days, newest first,
/// capped at ten.
pub fn build_trending(cases: &[Case], now: DateTime<Utc>) -> TrendingData {
    let window_start = now - Duration::days(TRENDING_WINDOW_DAYS);
    let mut recent: Vec<&Case> = cases
        .iter()
        .filter(|c| {
            DateTime::parse_from_rfc3339(&c.date)
                .map(|dt| dt.with_timezone(&Utc) >= window_start)
                .unwrap_or(false)
        })
        .collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(TRENDING_CAP);

    TrendingData {
        generated: to_iso(now),
        period: "week".to_string(),
        cases: recent
            .iter()
            .map(|c| TrendingCard {
                id: c.id.clone(),
                title: c.parties.title.clone(),
                court: c.court.clone(),
                date: c.date.clone(),
                jurisdiction: c.jurisdiction,
                tldr60: c.tldr60.clone(),
                tags: c.tags.clone(),
            })
            .collect(),
    }
}

/// Build the today snapshot: full records whose date falls on `today`
/// (a `YYYY-MM-DD` day).
pub fn build_today(cases: &[Case], today: &str) -> TodayData {
    let todays: Vec<Case> = cases
        .iter()
        .filter(|c| c.day_bucket() == today)
        .cloned()
        .collect();
    TodayData {
        date: today.to_string(),
        count: todays.len(),
        cases: todays,
    }
}

/// Rebuild every derived view from the persisted case files.
#[instrument(level = "info", skip_all)]
pub async fn build_all(
    data_dir: &str,
    public_dir: &str,
    now: DateTime<Utc>,
) -> Result<(), Box<dyn Error>> {
    let cases_dir = Path::new(data_dir).join("cases");
    let cases = load_all_cases(&cases_dir.to_string_lossy()).await;
    if cases.is_empty() {
        info!("No cases found; run the scraper and summarizer first");
        return Ok(());
    }

    let day_index = build_day_index(&cases);
    fs::write(
        Path::new(data_dir).join("index.json"),
        serde_json::to_string_pretty(&day_index)?,
    )
    .await?;
    info!(days = day_index.len(), "Built day index");

    let search_index = build_search_index(&cases, now);
    fs::write(
        Path::new(data_dir).join("search-index.json"),
        serde_json::to_string_pretty(&search_index)?,
    )
    .await?;
    info!(cases = search_index.cases.len(), "Built search index");

    let trending = build_trending(&cases, now);
    fs::write(
        Path::new(data_dir).join("trending.json"),
        serde_json::to_string_pretty(&trending)?,
    )
    .await?;
    info!(cases = trending.cases.len(), "Built trending view");

    fs::create_dir_all(public_dir).await?;
    let today = build_today(&cases, &now.date_naive().to_string());
    fs::write(
        Path::new(public_dir).join("today.json"),
        serde_json::to_string_pretty(&today)?,
    )
    .await?;
    info!(cases = today.count, "Built today snapshot");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseParties, CaseSource, Jurisdiction};
    use chrono::TimeZone;

    fn case(id: &str, date: &str) -> Case {
        let mut case = Case::unsummarized(
            Jurisdiction::IN,
            "Supreme Court of India".to_string(),
            date.to_string(),
            CaseParties {
                title: format!("Appellant v. Respondent {}", id),
                ..CaseParties::default()
            },
            CaseSource::IndianKanoon,
            format!("https://indiankanoon.org/doc/{}/", id),
        );
        case.id = id.to_string();
        case
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 8, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_day_index_buckets_by_date_portion() {
        let cases = vec![
            case("a", "2025-09-01T10:00:00.000Z"),
            case("b", "2025-09-01T23:59:59.000Z"),
            case("c", "2025-09-02T00:00:00.000Z"),
        ];
        let index = build_day_index(&cases);
        assert_eq!(index.len(), 2);
        // Newest day first.
        assert_eq!(index[0].date, "2025-09-02");
        assert_eq!(index[0].count, 1);
        assert_eq!(index[1].date, "2025-09-01");
        assert_eq!(index[1].count, 2);
        // A case lands in exactly one bucket.
        let total: usize = index.iter().map(|e| e.count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_search_text_is_lowercase_concat() {
        let mut c = case("a", "2025-09-01T00:00:00.000Z");
        c.tldr60 = "Bail Granted".to_string();
        c.tags = vec!["Criminal Procedure".to_string()];
        c.statutes = vec!["CrPC s.439".to_string()];
        c.neutral_citation = Some("[2025] 1 SCC 100".to_string());
        let blob = search_text(&c);
        assert!(blob.contains("appellant v. respondent a"));
        assert!(blob.contains("supreme court of india"));
        assert!(blob.contains("bail granted"));
        assert!(blob.contains("criminal procedure"));
        assert!(blob.contains("crpc s.439"));
        assert!(blob.contains("[2025] 1 scc 100"));
        assert_eq!(blob, blob.to_lowercase());
    }

    #[test]
    fn test_build_search_index_carries_filter_fields() {
        let cases = vec![case("a", "2025-09-01T00:00:00.000Z")];
        let index = build_search_index(&cases, fixed_now());
        assert_eq!(index.version, "1.0");
        assert_eq!(index.last_updated, "2025-09-08T12:00:00.000Z");
        assert_eq!(index.cases.len(), 1);
        assert_eq!(index.cases[0].jurisdiction, Jurisdiction::IN);
        assert_eq!(index.cases[0].date, "2025-09-01T00:00:00.000Z");
    }

    #[test]
    fn test_trending_window_and_cap() {
        let mut cases: Vec<Case> = (1..=12)
            .map(|i| case(&format!("recent-{}", i), &format!("2025-09-{:02}T00:00:00.000Z", i)))
            .collect();
        cases.push(case("stale", "2025-08-20T00:00:00.000Z"));

        let trending = build_trending(&cases, fixed_now());
        assert_eq!(trending.period, "week");
        // Window start is 2025-09-01T12:00; the cutoff keeps the 2nd..12th.
        assert!(trending.cases.len() <= 10);
        assert_eq!(trending.cases[0].id, "recent-12");
        assert!(trending.cases.iter().all(|c| c.id != "stale"));
        // Dates strictly descending.
        for pair in trending.cases.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[test]
    fn test_trending_skips_unparseable_dates() {
        let cases = vec![case("bad", "not-a-date"), case("ok", "2025-09-08T00:00:00.000Z")];
        let trending = build_trending(&cases, fixed_now());
        assert_eq!(trending.cases.len(), 1);
        assert_eq!(trending.cases[0].id, "ok");
    }

    #[test]
    fn test_build_today_filters_by_calendar_day() {
        let cases = vec![
            case("today", "2025-09-08T09:00:00.000Z"),
            case("yesterday", "2025-09-07T23:00:00.000Z"),
        ];
        let today = build_today(&cases, "2025-09-08");
        assert_eq!(today.count, 1);
        assert_eq!(today.cases[0].id, "today");
        assert_eq!(today.date, "2025-09-08");
    }

    #[tokio::test]
    async fn test_load_all_cases_skips_bad_files() {
        let dir = std::env::temp_dir().join("five_min_case_load_test");
        let _ = fs::remove_dir_all(&dir).await;
        let nested = dir.join("2025").join("09");
        fs::create_dir_all(&nested).await.unwrap();

        let good = vec![case("a", "2025-09-01T00:00:00.000Z")];
        fs::write(
            nested.join("01.json"),
            serde_json::to_string_pretty(&good).unwrap(),
        )
        .await
        .unwrap();
        fs::write(nested.join("02.json"), "{ not valid json").await.unwrap();
        fs::write(nested.join("notes.txt"), "ignored").await.unwrap();

        let cases = load_all_cases(&dir.to_string_lossy()).await;
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id, "a");

        let _ = fs::remove_dir_all(&dir).await;
    }
}
