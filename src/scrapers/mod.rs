//! Scrapers for court judgments and legal news.
//!
//! Each source is described by a tagged descriptor and fetched through a
//! uniform capability: hand the descriptor to a fetch function, get back a
//! bounded batch of normalized records. One source failing — network, HTTP
//! status, malformed feed — logs the error and yields an empty batch; the
//! run continues with the next source. No retries happen at this layer.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Indian Kanoon feeds | [`feeds`] | RSS | Supreme Court, Delhi HC, Bombay HC |
//! | UK Judiciary | [`feeds`] | RSS | Site feed, treated as a judgment feed |
//! | Indian Kanoon API | [`kanoon`] | Search + document API | Requires API key; paid per request |
//! | CourtListener | [`courtlistener`] | Opinion search API | Requires API key |
//! | Legal news outlets | [`news`] | RSS | Bar & Bench, LiveLaw, SCC Blog, ... |
//!
//! Sources are processed one at a time, in the order configured here, to
//! respect third-party rate limits.

pub mod courtlistener;
pub mod feeds;
pub mod kanoon;
pub mod news;

use crate::models::Case;
use thiserror::Error;

/// Failure while fetching or decoding one source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("feed parse error: {0}")]
    Feed(#[from] rss::Error),
    #[error("unexpected response shape: {0}")]
    Json(#[from] serde_json::Error),
}

/// A configured judgment source, tagged by the kind of collaborator that
/// serves it.
#[derive(Debug, Clone)]
pub enum CaseSourceDescriptor {
    /// Syndication feed of recent judgments.
    Feed(feeds::CaseFeed),
    /// Paginated opinion-search API.
    Search(SearchApi),
}

/// The search APIs a scrape run can query.
#[derive(Debug, Clone, Copy)]
pub enum SearchApi {
    CourtListener,
}

impl CaseSourceDescriptor {
    /// Human-readable source name for logging.
    pub fn name(&self) -> &str {
        match self {
            CaseSourceDescriptor::Feed(feed) => feed.name,
            CaseSourceDescriptor::Search(SearchApi::CourtListener) => "CourtListener",
        }
    }
}

/// Every judgment source for one scrape run, in fixed processing order:
/// the Indian feeds, the UK feed, then the US search API.
pub fn case_sources() -> Vec<CaseSourceDescriptor> {
    let mut sources: Vec<CaseSourceDescriptor> = feeds::case_feeds()
        .into_iter()
        .map(CaseSourceDescriptor::Feed)
        .collect();
    sources.push(CaseSourceDescriptor::Search(SearchApi::CourtListener));
    sources
}

/// Fetch one judgment source. Per-source failures are already swallowed:
/// an unreachable or malformed source yields an empty batch.
pub async fn fetch_cases(
    http: &reqwest::Client,
    descriptor: &CaseSourceDescriptor,
    courtlistener_api_key: Option<&str>,
) -> Vec<Case> {
    match descriptor {
        CaseSourceDescriptor::Feed(feed) => feeds::fetch_case_feed(http, feed).await,
        CaseSourceDescriptor::Search(SearchApi::CourtListener) => {
            courtlistener::fetch_recent(http, courtlistener_api_key).await
        }
    }
}

/// GET a URL and return the response body, turning non-2xx statuses into
/// [`FetchError::Status`].
pub(crate) async fn get_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = http.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_sources_order_is_fixed() {
        let sources = case_sources();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "Supreme Court of India",
                "Delhi High Court",
                "Bombay High Court",
                "UK Judiciary",
                "CourtListener",
            ]
        );
    }
}
