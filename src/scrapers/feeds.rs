//! Court judgment RSS feeds.
//!
//! Indian Kanoon publishes per-court feeds of fresh judgments, and the UK
//! Judiciary site feed is close enough to treat the same way. Each feed is
//! capped at its top entries and normalized straight into [`Case`] records
//! with empty summary placeholders.

use crate::models::{Case, CaseSource, Jurisdiction, RawFeedItem};
use crate::normalize::{self, extract_parties, validate_case};
use crate::scrapers::{FetchError, get_bytes};
use chrono::Utc;
use rss::Channel;
use tracing::{debug, info, instrument, warn};

/// Cap on entries taken from a single feed per run.
pub const FEED_ITEM_CAP: usize = 20;

/// A judgment feed descriptor.
#[derive(Debug, Clone)]
pub struct CaseFeed {
    pub name: &'static str,
    pub url: &'static str,
    pub jurisdiction: Jurisdiction,
    pub source: CaseSource,
}

/// The configured judgment feeds, in processing order.
pub fn case_feeds() -> Vec<CaseFeed> {
    vec![
        CaseFeed {
            name: "Supreme Court of India",
            url: "https://indiankanoon.org/feeds/supremecourt.xml",
            jurisdiction: Jurisdiction::IN,
            source: CaseSource::IndianKanoon,
        },
        CaseFeed {
            name: "Delhi High Court",
            url: "https://indiankanoon.org/feeds/delhihc.xml",
            jurisdiction: Jurisdiction::IN,
            source: CaseSource::IndianKanoon,
        },
        CaseFeed {
            name: "Bombay High Court",
            url: "https://indiankanoon.org/feeds/bombayhc.xml",
            jurisdiction: Jurisdiction::IN,
            source: CaseSource::IndianKanoon,
        },
        CaseFeed {
            name: "UK Judiciary",
            url: "https://www.judiciary.uk/feed/",
            jurisdiction: Jurisdiction::UK,
            source: CaseSource::JudiciaryUk,
        },
    ]
}

/// Fetch one judgment feed and normalize its entries.
///
/// Any failure — network, HTTP status, feed parse — is logged and the feed
/// yields an empty batch so the run can continue with the next source.
#[instrument(level = "info", skip_all, fields(feed = %feed.name))]
pub async fn fetch_case_feed(http: &reqwest::Client, feed: &CaseFeed) -> Vec<Case> {
    let items = match fetch_feed_items(http, feed.url).await {
        Ok(items) => items,
        Err(e) => {
            warn!(url = feed.url, error = %e, "Feed fetch failed; skipping source");
            return Vec::new();
        }
    };

    let mut cases = Vec::new();
    for item in items.into_iter().take(FEED_ITEM_CAP) {
        let case = normalize_item(feed, &item);
        match validate_case(&case) {
            Ok(()) => cases.push(case),
            Err(reason) => {
                warn!(url = %item.link, reason, "Dropping malformed feed entry");
            }
        }
    }

    info!(count = cases.len(), url = feed.url, "Scraped judgment feed");
    cases
}

/// Download a feed and pull out the fields the normalizer needs.
///
/// Entries missing a title or link are useless downstream and are dropped
/// here; everything else is optional.
async fn fetch_feed_items(http: &reqwest::Client, url: &str) -> Result<Vec<RawFeedItem>, FetchError> {
    let body = get_bytes(http, url).await?;
    let channel = Channel::read_from(&body[..])?;

    let mut items = Vec::new();
    for item in channel.items() {
        let (Some(title), Some(link)) = (item.title(), item.link()) else {
            debug!("Feed entry missing title or link; skipped");
            continue;
        };
        items.push(RawFeedItem {
            title: title.to_string(),
            link: link.to_string(),
            pub_date: item.pub_date().map(str::to_string),
        });
    }
    Ok(items)
}

/// Map one raw feed entry onto the canonical case shape.
fn normalize_item(feed: &CaseFeed, item: &RawFeedItem) -> Case {
    let parties = extract_parties(&item.title);
    let court = match feed.source {
        CaseSource::IndianKanoon => normalize::court_from_feed_link(&item.link),
        CaseSource::JudiciaryUk => "UK Courts".to_string(),
        CaseSource::CourtListener => "Federal Court".to_string(),
    };
    let date = item
        .pub_date
        .as_deref()
        .and_then(normalize::parse_feed_date)
        .unwrap_or_else(|| normalize::to_iso(Utc::now()));

    let mut case = Case::unsummarized(
        feed.jurisdiction,
        court,
        date,
        parties,
        feed.source,
        item.link.clone(),
    );
    case.neutral_citation = normalize::extract_neutral_citation(&item.title);
    case
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sc_feed() -> CaseFeed {
        case_feeds().into_iter().next().unwrap()
    }

    fn uk_feed() -> CaseFeed {
        case_feeds().into_iter().last().unwrap()
    }

    #[test]
    fn test_normalize_item_end_to_end() {
        let item = RawFeedItem {
            title: "Dept. of Law v. Rao".to_string(),
            link: "https://x/1".to_string(),
            pub_date: Some("Mon, 01 Sep 2025 00:00:00 GMT".to_string()),
        };
        let case = normalize_item(&sc_feed(), &item);
        assert_eq!(case.parties.appellant.as_deref(), Some("Dept. of Law"));
        assert_eq!(case.parties.respondent.as_deref(), Some("Rao"));
        assert_eq!(case.date, "2025-09-01T00:00:00.000Z");
        assert_eq!(case.url, "https://x/1");
        assert!(case.tldr60.is_empty());
    }

    #[test]
    fn test_normalize_item_court_from_link() {
        let item = RawFeedItem {
            title: "A v. B".to_string(),
            link: "https://indiankanoon.org/feeds/delhihc/doc/1".to_string(),
            pub_date: None,
        };
        let case = normalize_item(&sc_feed(), &item);
        assert_eq!(case.court, "Delhi High Court");
    }

    #[test]
    fn test_normalize_item_uk_court_label() {
        let item = RawFeedItem {
            title: "R v. Smith".to_string(),
            link: "https://www.judiciary.uk/judgments/r-v-smith".to_string(),
            pub_date: None,
        };
        let case = normalize_item(&uk_feed(), &item);
        assert_eq!(case.court, "UK Courts");
        assert_eq!(case.jurisdiction, Jurisdiction::UK);
    }

    #[test]
    fn test_normalize_item_missing_pub_date_defaults_to_now() {
        let item = RawFeedItem {
            title: "A v. B".to_string(),
            link: "https://x/1".to_string(),
            pub_date: None,
        };
        let case = normalize_item(&sc_feed(), &item);
        // Fetch-time fallback still produces a full ISO timestamp.
        assert!(case.date.ends_with('Z'));
        assert_eq!(case.day_bucket().len(), "2025-09-01".len());
    }

    #[test]
    fn test_feed_parse_rejects_garbage() {
        let result = Channel::read_from(&b"this is not xml"[..]);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_feed_items_drops_incomplete_entries() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>Supreme Court of India</title>
              <link>https://indiankanoon.org</link>
              <description>feed</description>
              <item>
                <title>Sharma v. Union of India</title>
                <link>https://indiankanoon.org/doc/1/</link>
                <pubDate>Mon, 01 Sep 2025 00:00:00 GMT</pubDate>
              </item>
              <item>
                <description>no title, no link</description>
              </item>
            </channel></rss>"#;
        let channel = Channel::read_from(xml.as_bytes()).unwrap();
        let complete: Vec<_> = channel
            .items()
            .iter()
            .filter(|i| i.title().is_some() && i.link().is_some())
            .collect();
        assert_eq!(channel.items().len(), 2);
        assert_eq!(complete.len(), 1);
    }
}
