//! Normalization of heterogeneous scraper output into the canonical record
//! shape.
//!
//! Every source (judgment RSS feeds, the Indian Kanoon search API, the
//! CourtListener API, legal-news feeds) produces a slightly different raw
//! shape. The functions here map those shapes onto [`crate::models::Case`]
//! and [`crate::models::NewsItem`] fields:
//!
//! - Party extraction: a regex cascade over the case title trying `"X v. Y"`,
//!   `"X vs Y"`, `"X versus Y"` in order; first match wins
//! - Court extraction: source-specific lookups with generic fallbacks
//! - Date extraction: an ordered fallback chain that downstream day-bucketing
//!   depends on, so the order is load-bearing
//! - Stable ids: URL-hash ids for news, source ids or synthesized ids for
//!   cases

use crate::models::{Case, CaseParties};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use rand::distr::{Alphanumeric, SampleString};
use regex::Regex;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of the hex-encoded, URL-derived news id.
pub const NEWS_ID_LEN: usize = 12;

// Tried in order; the first match wins.
static PARTY_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^(.+?)\s+v\.\s+(.+)$").unwrap(),
        Regex::new(r"(?i)^(.+?)\s+vs\.?\s+(.+)$").unwrap(),
        Regex::new(r"(?i)^(.+?)\s+versus\s+(.+)$").unwrap(),
    ]
});

static DDMMYYYY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{2})-(\d{2})-(\d{4})").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());
static CITATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{4})\]\s+(\d+\s+)?(\w+)\s+(\d+)").unwrap());
static TRAILING_YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\d{4}\s*$").unwrap());

/// Format a timestamp the way every record field carries it:
/// `2025-09-01T00:00:00.000Z`.
pub fn to_iso(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Split a case title into its parties where an "A v. B" pattern matches.
///
/// The separators `v.`, `vs`/`vs.`, and `versus` are tried in that order,
/// case-insensitively; the first match sets `appellant` and `respondent`,
/// both trimmed. A title with no separator is kept whole with no party
/// breakdown.
pub fn extract_parties(title: &str) -> CaseParties {
    for pattern in PARTY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(title) {
            return CaseParties {
                title: title.trim().to_string(),
                appellant: Some(caps[1].trim().to_string()),
                respondent: Some(caps[2].trim().to_string()),
                ..CaseParties::default()
            };
        }
    }
    CaseParties {
        title: title.trim().to_string(),
        ..CaseParties::default()
    }
}

/// Map an Indian Kanoon feed link onto a canonical court name.
///
/// The feed URL embeds the court slug; unknown slugs fall back to the
/// generic "High Court".
pub fn court_from_feed_link(link: &str) -> String {
    if link.contains("supremecourt") {
        "Supreme Court of India".to_string()
    } else if link.contains("delhihc") {
        "Delhi High Court".to_string()
    } else if link.contains("bombayhc") {
        "Bombay High Court".to_string()
    } else {
        "High Court".to_string()
    }
}

/// Normalize an Indian Kanoon `docsource` field ("Delhi High Court 2025")
/// into a court name by stripping a trailing year.
pub fn court_from_docsource(docsource: &str) -> String {
    TRAILING_YEAR_RE.replace(docsource, "").trim().to_string()
}

/// Resolve a record date using the ordered fallback chain:
///
/// 1. an explicit `DD-MM-YYYY` publish date from the source metadata
/// 2. a 4-digit year found in the title, pinned to January 1 of that year
/// 3. the fetch time
///
/// Day-bucketing downstream depends on this exact order.
pub fn extract_date(publishdate: Option<&str>, title: Option<&str>, now: DateTime<Utc>) -> String {
    if let Some(pd) = publishdate {
        if let Some(caps) = DDMMYYYY_RE.captures(pd) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let month: u32 = caps[2].parse().unwrap_or(0);
            let year: i32 = caps[3].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                    return to_iso(dt.and_utc());
                }
            }
        }
    }

    if let Some(t) = title {
        if let Some(caps) = YEAR_RE.captures(t) {
            let year: i32 = caps[1].parse().unwrap_or(0);
            if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
                if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                    return to_iso(dt.and_utc());
                }
            }
        }
    }

    to_iso(now)
}

/// Parse a feed-provided publication date into the canonical ISO form.
///
/// Tries RFC 2822 (the usual RSS `pubDate` shape), then RFC 3339, then a
/// bare `YYYY-MM-DD HH:MM:SS`, then a bare `YYYY-MM-DD`. Returns `None` when
/// nothing matches so the caller can fall back to fetch time.
pub fn parse_feed_date(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(to_iso(dt.with_timezone(&Utc)));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(to_iso(dt.with_timezone(&Utc)));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(to_iso(dt.and_utc()));
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| to_iso(dt.and_utc()));
    }
    None
}

/// Derive the deterministic news id from an article URL: the first 12 hex
/// chars of the URL's SHA-256. Stable across runs, so re-ingestion writes
/// the same document id.
pub fn news_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..NEWS_ID_LEN].to_string()
}

/// Synthesize a case id for records whose source provides none:
/// `YYYY-MM-<court abbreviation>-<random suffix>`.
pub fn synthesize_case_id(date: &str, court: &str) -> String {
    let year_month = if date.len() >= 7 { &date[..7] } else { "0000-00" };
    let abbr: String = court.chars().take(3).collect::<String>().to_uppercase();
    let abbr = if abbr.is_empty() { "UNK".to_string() } else { abbr };
    let suffix = Alphanumeric
        .sample_string(&mut rand::rng(), 4)
        .to_lowercase();
    format!("{}-{}-{}", year_month, abbr, suffix)
}

/// Coerce a source-provided document id to a string.
///
/// The search APIs return ids as either JSON numbers or strings depending on
/// endpoint and vintage; both normalize to the same string id.
pub fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pull a neutral citation (e.g. `[2023] 3 SCC 441`) out of a case title.
pub fn extract_neutral_citation(title: &str) -> Option<String> {
    CITATION_RE
        .find(title)
        .map(|m| m.as_str().trim().to_string())
}

/// Validate a normalized case against the canonical field set.
///
/// Malformed records are skipped with a logged reason rather than failing
/// the batch; this is the acceptance gate.
pub fn validate_case(case: &Case) -> Result<(), &'static str> {
    if case.parties.title.trim().is_empty() {
        return Err("empty title");
    }
    if case.url.trim().is_empty() {
        return Err("empty url");
    }
    if case.date.trim().is_empty() {
        return Err("empty date");
    }
    Ok(())
}
