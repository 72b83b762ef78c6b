//! Data models for cases, legal news items, and the derived index views.
//!
//! This module defines the core data structures used throughout the pipeline:
//! - [`RawFeedItem`]: an unprocessed entry pulled from a syndication feed
//! - [`Case`]: the canonical judgment record every source is normalized into
//! - [`NewsItem`]: a legal-news article scraped from an RSS feed
//! - Index views: [`CaseIndexEntry`], [`SearchIndex`], [`TrendingData`],
//!   [`TodayData`], [`NewsData`]
//!
//! The records use camelCase field names on the wire to match the JSON schema
//! the reader UI consumes, hence `#[serde(rename_all = "camelCase")]` on the
//! serialized types.

use serde::{Deserialize, Serialize};

/// Jurisdiction a case was decided in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Jurisdiction {
    US,
    IN,
    UK,
}

/// Origin feed or API a case record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum CaseSource {
    #[serde(rename = "indiankanoon")]
    IndianKanoon,
    #[serde(rename = "courtlistener")]
    CourtListener,
    #[serde(rename = "judiciary-uk")]
    JudiciaryUk,
}

/// A raw entry from a judgment feed before normalization.
///
/// Only `title` and `link` are required downstream; everything else is
/// best-effort and may be missing from the feed.
#[derive(Debug, Clone)]
pub struct RawFeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: Option<String>,
}

/// The parties to a case, split out of the title where possible.
///
/// `title` always holds the full (trimmed) case title. The breakdown fields
/// are only set when the title matches an "A v. B" style pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct CaseParties {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appellant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respondent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub petitioner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defendant: Option<String>,
}

/// The structured five-minute brief for a case.
///
/// All sections default to empty strings; the summarizer fills whichever
/// sections it can recognize in the model output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct Brief5Min {
    pub facts: String,
    pub issues: String,
    pub holding: String,
    pub reasoning: String,
    pub disposition: String,
}

/// A quotable passage from a judgment, with an optional pinpoint reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyQuote {
    pub quote: String,
    /// Paragraph or page reference, e.g. `¶45`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
}

/// The canonical judgment record all sources are mapped into.
///
/// A `Case` is created by a scraper with empty summary placeholders, mutated
/// once by the summarization step, and eventually removed by the retention
/// sweep. `url` is the dedup key: a second record carrying an already-seen
/// URL is dropped before persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub jurisdiction: Jurisdiction,
    pub court: String,
    /// ISO-8601 timestamp; defaults to fetch time when the source omits it.
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutral_citation: Option<String>,
    #[serde(default)]
    pub reporter_citations: Vec<String>,
    pub parties: CaseParties,
    #[serde(default)]
    pub statutes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judges: Option<Vec<String>>,
    pub source: CaseSource,
    pub url: String,
    pub tldr60: String,
    pub brief5min: Brief5Min,
    pub key_quotes: Vec<KeyQuote>,
    /// Practice areas, e.g. "Constitutional", "Arbitration".
    pub tags: Vec<String>,
    /// Judgment text kept for the summarizer; never written to index views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Case {
    /// Build a case with empty summary placeholders, the shape every scraper
    /// emits before the summarization step runs.
    pub fn unsummarized(
        jurisdiction: Jurisdiction,
        court: String,
        date: String,
        parties: CaseParties,
        source: CaseSource,
        url: String,
    ) -> Self {
        Case {
            id: String::new(),
            jurisdiction,
            court,
            date,
            neutral_citation: None,
            reporter_citations: Vec::new(),
            parties,
            statutes: Vec::new(),
            outcome: None,
            judges: None,
            source,
            url,
            tldr60: String::new(),
            brief5min: Brief5Min::default(),
            key_quotes: Vec::new(),
            tags: Vec::new(),
            raw_text: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// The `YYYY-MM-DD` day bucket this case falls into.
    pub fn day_bucket(&self) -> &str {
        self.date.split('T').next().unwrap_or(&self.date)
    }
}

/// A legal-news article normalized from an RSS feed.
///
/// `id` is derived deterministically from `url`, so re-ingesting the same
/// article produces the same document id and the second write becomes a
/// no-op conflict at the store.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    /// HTML-stripped, whitespace-collapsed, truncated to 300 chars.
    pub summary: String,
    pub url: String,
    pub source: String,
    pub published_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One day's worth of news, as written to the day files and today snapshot.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewsData {
    pub date: String,
    pub count: usize,
    pub news: Vec<NewsItem>,
}

/// Trimmed case projection used inside the day index.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CaseIndexCard {
    pub id: String,
    pub title: String,
    pub court: String,
    pub tags: Vec<String>,
}

/// One day bucket in the master index.
#[derive(Debug, Deserialize, Serialize)]
pub struct CaseIndexEntry {
    pub date: String,
    pub count: usize,
    pub cases: Vec<CaseIndexCard>,
}

/// Flat substring-search view over every case.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    pub version: String,
    pub last_updated: String,
    pub cases: Vec<SearchEntry>,
}

/// One searchable case: a lowercase text blob plus the filterable fields.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub id: String,
    pub search_text: String,
    pub jurisdiction: Jurisdiction,
    pub court: String,
    pub date: String,
    pub tags: Vec<String>,
}

/// Case projection used by the trending view.
#[derive(Debug, Deserialize, Serialize)]
pub struct TrendingCard {
    pub id: String,
    pub title: String,
    pub court: String,
    pub date: String,
    pub jurisdiction: Jurisdiction,
    pub tldr60: String,
    pub tags: Vec<String>,
}

/// Recency-ranked cases from the last seven days. A stand-in for a real
/// popularity signal, not one.
#[derive(Debug, Deserialize, Serialize)]
pub struct TrendingData {
    pub generated: String,
    pub period: String,
    pub cases: Vec<TrendingCard>,
}

/// Full records whose date falls on the current calendar day; the primary
/// feed the UI reads at load.
#[derive(Debug, Deserialize, Serialize)]
pub struct TodayData {
    pub date: String,
    pub count: usize,
    pub cases: Vec<Case>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> Case {
        Case::unsummarized(
            Jurisdiction::IN,
            "Supreme Court of India".to_string(),
            "2025-09-01T10:00:00.000Z".to_string(),
            CaseParties {
                title: "Dept. of Law v. Rao".to_string(),
                appellant: Some("Dept. of Law".to_string()),
                respondent: Some("Rao".to_string()),
                ..CaseParties::default()
            },
            CaseSource::IndianKanoon,
            "https://indiankanoon.org/doc/12345/".to_string(),
        )
    }

    #[test]
    fn test_case_serializes_camel_case() {
        let mut case = sample_case();
        case.created_at = Some("2025-09-01T12:00:00.000Z".to_string());
        let json = serde_json::to_string(&case).unwrap();
        assert!(json.contains("\"keyQuotes\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"tldr60\""));
        assert!(json.contains("\"jurisdiction\":\"IN\""));
        assert!(json.contains("\"source\":\"indiankanoon\""));
        // Absent optionals stay off the wire entirely.
        assert!(!json.contains("neutralCitation"));
        assert!(!json.contains("rawText"));
    }

    #[test]
    fn test_case_roundtrip() {
        let case = sample_case();
        let json = serde_json::to_string(&case).unwrap();
        let parsed: Case = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.url, case.url);
        assert_eq!(parsed.parties.appellant.as_deref(), Some("Dept. of Law"));
        assert_eq!(parsed.source, CaseSource::IndianKanoon);
    }

    #[test]
    fn test_case_tolerates_missing_list_fields() {
        // Older stored documents may predate reporterCitations/statutes.
        let json = r#"{
            "id": "2025-09-SUP-ab12",
            "jurisdiction": "UK",
            "court": "UK Courts",
            "date": "2025-09-01T00:00:00.000Z",
            "parties": { "title": "R v. Smith" },
            "source": "judiciary-uk",
            "url": "https://www.judiciary.uk/x",
            "tldr60": "",
            "brief5min": {
                "facts": "", "issues": "", "holding": "",
                "reasoning": "", "disposition": ""
            },
            "keyQuotes": [],
            "tags": []
        }"#;
        let parsed: Case = serde_json::from_str(json).unwrap();
        assert!(parsed.reporter_citations.is_empty());
        assert!(parsed.statutes.is_empty());
        assert_eq!(parsed.jurisdiction, Jurisdiction::UK);
    }

    #[test]
    fn test_unsummarized_placeholders_are_empty() {
        let case = sample_case();
        assert!(case.tldr60.is_empty());
        assert!(case.brief5min.facts.is_empty());
        assert!(case.key_quotes.is_empty());
        assert!(case.tags.is_empty());
        assert!(case.statutes.is_empty());
    }

    #[test]
    fn test_day_bucket() {
        let case = sample_case();
        assert_eq!(case.day_bucket(), "2025-09-01");
    }

    #[test]
    fn test_news_item_serializes_camel_case() {
        let item = NewsItem {
            id: "abc123def456".to_string(),
            title: "SC stays demolition order".to_string(),
            summary: "The Supreme Court stayed the order...".to_string(),
            url: "https://www.livelaw.in/x".to_string(),
            source: "LiveLaw".to_string(),
            published_date: "2025-09-01T06:00:00.000Z".to_string(),
            category: Some("Supreme Court".to_string()),
            author: None,
            image_url: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"publishedDate\""));
        assert!(!json.contains("\"author\""));
        assert!(!json.contains("\"imageUrl\""));
    }

    #[test]
    fn test_case_source_wire_names() {
        assert_eq!(
            serde_json::to_string(&CaseSource::JudiciaryUk).unwrap(),
            "\"judiciary-uk\""
        );
        assert_eq!(
            serde_json::from_str::<CaseSource>("\"courtlistener\"").unwrap(),
            CaseSource::CourtListener
        );
    }
}
