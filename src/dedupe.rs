//! Batch deduplication for cases and news items.
//!
//! Two dedup keys exist: the canonical `url` (against the already-persisted
//! set) and the normalized title (within a single ingestion batch). Both
//! passes are pure functions over explicit inputs so a run carries no hidden
//! state between invocations.

use crate::models::{Case, NewsItem};
use crate::utils::normalize_title;
use chrono::DateTime;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::debug;

/// Drop cases whose `url` is already present in `existing_urls`.
///
/// First write wins: a record re-scraped on a later run is a duplicate and
/// never reaches persistence.
pub fn dedupe_by_url(cases: Vec<Case>, existing_urls: &HashSet<String>) -> Vec<Case> {
    let before = cases.len();
    let kept: Vec<Case> = cases
        .into_iter()
        .filter(|c| !existing_urls.contains(&c.url))
        .unique_by(|c| c.url.clone())
        .collect();
    debug!(before, after = kept.len(), "Deduplicated cases by url");
    kept
}

/// Collapse news items with the same normalized title, keeping the most
/// recent copy.
///
/// The batch is sorted by `publishedDate` descending first, so "first
/// occurrence wins" means the newest article survives when several feeds
/// syndicate the same story.
pub fn dedupe_news(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    let before = items.len();
    items.sort_by_key(|item| {
        std::cmp::Reverse(
            DateTime::parse_from_rfc3339(&item.published_date)
                .map(|dt| dt.timestamp_millis())
                .unwrap_or(0),
        )
    });
    let kept: Vec<NewsItem> = items
        .into_iter()
        .unique_by(|item| normalize_title(&item.title))
        .collect();
    debug!(before, after = kept.len(), "Deduplicated news by title");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CaseParties, CaseSource, Jurisdiction};

    fn case_with_url(url: &str) -> Case {
        Case::unsummarized(
            Jurisdiction::IN,
            "Court".to_string(),
            "2025-09-01T00:00:00.000Z".to_string(),
            CaseParties {
                title: format!("A v. B ({})", url),
                ..CaseParties::default()
            },
            CaseSource::IndianKanoon,
            url.to_string(),
        )
    }

    fn news(title: &str, url: &str, published: &str) -> NewsItem {
        NewsItem {
            id: crate::normalize::news_id(url),
            title: title.to_string(),
            summary: String::new(),
            url: url.to_string(),
            source: "LiveLaw".to_string(),
            published_date: published.to_string(),
            category: None,
            author: None,
            image_url: None,
        }
    }

    #[test]
    fn test_dedupe_by_url_drops_existing() {
        let existing: HashSet<String> = ["https://x/1".to_string()].into_iter().collect();
        let batch = vec![case_with_url("https://x/1"), case_with_url("https://x/2")];
        let kept = dedupe_by_url(batch, &existing);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://x/2");
    }

    #[test]
    fn test_dedupe_by_url_is_idempotent() {
        // Ingesting the same batch twice yields the same stored set size as
        // ingesting it once.
        let batch = vec![case_with_url("https://x/1"), case_with_url("https://x/2")];
        let first = dedupe_by_url(batch.clone(), &HashSet::new());
        let stored: HashSet<String> = first.iter().map(|c| c.url.clone()).collect();
        let second = dedupe_by_url(batch, &stored);
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn test_dedupe_by_url_collapses_within_batch() {
        let batch = vec![case_with_url("https://x/1"), case_with_url("https://x/1")];
        let kept = dedupe_by_url(batch, &HashSet::new());
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_dedupe_news_keeps_most_recent_duplicate() {
        let batch = vec![
            news(
                "SC stays demolition order",
                "https://a/1",
                "2025-09-01T06:00:00.000Z",
            ),
            news(
                "SC Stays Demolition Order!",
                "https://b/1",
                "2025-09-02T06:00:00.000Z",
            ),
        ];
        let kept = dedupe_news(batch);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://b/1");
    }

    #[test]
    fn test_dedupe_news_sorts_descending() {
        let batch = vec![
            news("older story", "https://a/1", "2025-09-01T06:00:00.000Z"),
            news("newer story", "https://a/2", "2025-09-03T06:00:00.000Z"),
            news("middle story", "https://a/3", "2025-09-02T06:00:00.000Z"),
        ];
        let kept = dedupe_news(batch);
        let titles: Vec<&str> = kept.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["newer story", "middle story", "older story"]);
    }

    #[test]
    fn test_dedupe_news_unparseable_dates_sort_last() {
        let batch = vec![
            news("undated story", "https://a/1", "whenever"),
            news("dated story", "https://a/2", "2025-09-01T06:00:00.000Z"),
        ];
        let kept = dedupe_news(batch);
        assert_eq!(kept[0].title, "dated story");
        assert_eq!(kept.len(), 2);
    }
}
