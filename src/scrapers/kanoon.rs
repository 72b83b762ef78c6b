//! Indian Kanoon API client.
//!
//! A paid, token-authenticated API with two endpoints the pipeline uses:
//! `/search/` (paginated over a date range and court doctype) and
//! `/doc/{tid}/` (full judgment HTML plus bench/author/citation metadata).
//! Every request costs money, so a run fetches a deliberately small slice:
//! the top Supreme Court results plus a couple of cases from each major High
//! Court, with a flat delay between document fetches.

use crate::models::{Case, CaseSource, Jurisdiction};
use crate::normalize::{self, coerce_id, extract_parties};
use crate::scrapers::FetchError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use scraper::Html;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

const API_BASE: &str = "https://api.indiankanoon.org";

/// Search hits at or below this size are routine orders, not judgments.
const DOC_SIZE_FLOOR: u64 = 5000;

const SUPREME_COURT_CAP: usize = 10;
const HIGH_COURT_CAP: usize = 2;
const HIGH_COURTS: [&str; 5] = ["delhi", "bombay", "chennai", "kolkata", "karnataka"];

/// Flat delay between document fetches.
const REQUEST_DELAY: StdDuration = StdDuration::from_secs(1);

const COST_PER_REQUEST_INR: f64 = 0.50;

/// One hit from the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchDoc {
    /// Returned as a number or a string depending on endpoint vintage.
    pub tid: Value,
    pub title: String,
    pub docsource: String,
    #[serde(default)]
    pub docsize: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
    #[serde(default)]
    found: Option<Value>,
}

/// A full judgment from the document endpoint.
#[derive(Debug, Deserialize)]
pub struct KanoonDocument {
    /// Judgment body as HTML.
    pub doc: String,
    pub tid: Value,
    pub title: String,
    pub docsource: String,
    #[serde(default)]
    pub publishdate: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub bench: Option<String>,
}

/// Token-authenticated Indian Kanoon client.
pub struct KanoonClient {
    http: reqwest::Client,
    api_key: String,
}

impl KanoonClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    async fn request(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{}", API_BASE, path);
        let response = self
            .http
            .get(&url)
            .query(params)
            .header("Authorization", format!("Token {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }

    /// Search one page of cases for a date range and doctype, dropping
    /// routine orders by document size.
    #[instrument(level = "info", skip(self))]
    pub async fn search(
        &self,
        from_date: &str,
        to_date: &str,
        doctypes: &str,
        pagenum: u32,
    ) -> Result<Vec<SearchDoc>, FetchError> {
        let page = pagenum.to_string();
        let params = [
            ("fromdate", from_date),
            ("todate", to_date),
            ("doctypes", doctypes),
            ("pagenum", page.as_str()),
            // Empty query matches every case in the date range.
            ("formInput", ""),
        ];
        let response = self.request("/search/", &params).await?;
        let parsed: SearchResponse = response.json().await?;

        let total = parsed
            .found
            .as_ref()
            .and_then(coerce_id)
            .unwrap_or_default();
        let docs = keep_substantive(parsed.docs);
        info!(doctypes, total = %total, kept = docs.len(), "Searched cases");
        Ok(docs)
    }

    /// Fetch one full judgment with its citation lists capped.
    #[instrument(level = "info", skip(self), fields(%tid))]
    pub async fn fetch_document(&self, tid: &str) -> Result<KanoonDocument, FetchError> {
        let params = [("maxcites", "20"), ("maxcitedby", "20")];
        let response = self.request(&format!("/doc/{}/", tid), &params).await?;
        Ok(response.json().await?)
    }

    /// Scrape yesterday's judgments: the top Supreme Court cases plus a few
    /// from each major High Court.
    ///
    /// Search failures skip that court; document failures skip that
    /// document. The estimated API spend is logged at the end.
    #[instrument(level = "info", skip_all)]
    pub async fn scrape_recent(&self) -> Vec<Case> {
        let now = Utc::now();
        let yesterday = ddmmyyyy((now - Duration::days(1)).date_naive());
        info!(date = %yesterday, "Scraping Indian Kanoon cases");

        let mut cases = Vec::new();
        let mut searches = 0usize;

        searches += 1;
        match self.search(&yesterday, &yesterday, "supremecourt", 0).await {
            Ok(hits) => {
                self.fetch_hits(&hits[..hits.len().min(SUPREME_COURT_CAP)], now, &mut cases)
                    .await;
            }
            Err(e) => error!(error = %e, "Supreme Court search failed"),
        }

        for court in HIGH_COURTS {
            searches += 1;
            match self.search(&yesterday, &yesterday, court, 0).await {
                Ok(hits) => {
                    self.fetch_hits(&hits[..hits.len().min(HIGH_COURT_CAP)], now, &mut cases)
                        .await;
                }
                Err(e) => error!(court, error = %e, "High Court search failed"),
            }
        }

        let documents = cases.len();
        let cost_inr = (searches + documents) as f64 * COST_PER_REQUEST_INR;
        info!(searches, documents, cost_inr, "Estimated API spend for run");
        cases
    }

    async fn fetch_hits(&self, hits: &[SearchDoc], now: DateTime<Utc>, cases: &mut Vec<Case>) {
        for hit in hits {
            let Some(tid) = coerce_id(&hit.tid) else {
                warn!(title = %hit.title, "Search hit carries no usable id; skipped");
                continue;
            };
            match self.fetch_document(&tid).await {
                Ok(doc) => {
                    if let Some(case) = document_to_case(&doc, now) {
                        cases.push(case);
                    }
                }
                Err(e) => error!(%tid, error = %e, "Document fetch failed; skipped"),
            }
            sleep(REQUEST_DELAY).await;
        }
    }
}

/// Drop routine orders: only documents above the size floor are worth a
/// summary.
fn keep_substantive(docs: Vec<SearchDoc>) -> Vec<SearchDoc> {
    docs.into_iter()
        .filter(|doc| doc.docsize.unwrap_or(0) > DOC_SIZE_FLOOR)
        .collect()
}

/// Map a fetched judgment onto the canonical case shape.
///
/// Returns `None` when the document id cannot be coerced to a string.
pub fn document_to_case(doc: &KanoonDocument, now: DateTime<Utc>) -> Option<Case> {
    let tid = coerce_id(&doc.tid)?;
    let parties = extract_parties(&doc.title);
    let court = normalize::court_from_docsource(&doc.docsource);
    let date = normalize::extract_date(doc.publishdate.as_deref(), Some(&doc.title), now);

    let mut case = Case::unsummarized(
        Jurisdiction::IN,
        court,
        date,
        parties,
        CaseSource::IndianKanoon,
        format!("https://indiankanoon.org/doc/{}/", tid),
    );
    case.id = tid;
    case.neutral_citation = normalize::extract_neutral_citation(&doc.title);
    // The bench listing names the full panel; a lone author is still a bench.
    case.judges = doc
        .bench
        .as_deref()
        .or(doc.author.as_deref())
        .map(|bench| {
            bench
                .split(',')
                .map(|j| j.trim().to_string())
                .filter(|j| !j.is_empty())
                .collect::<Vec<String>>()
        })
        .filter(|judges| !judges.is_empty());
    case.raw_text = Some(html_to_text(&doc.doc));
    Some(case)
}

/// Extract plain text from judgment HTML for the summarizer.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a date the way the search endpoint expects: `DD-MM-YYYY`.
fn ddmmyyyy(date: NaiveDate) -> String {
    format!("{:02}-{:02}-{}", date.day(), date.month(), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 15, 12, 0, 0).unwrap()
    }

    fn hit(tid: Value, docsize: Option<u64>) -> SearchDoc {
        SearchDoc {
            tid,
            title: "Sharma v. Union of India".to_string(),
            docsource: "Supreme Court of India".to_string(),
            docsize,
        }
    }

    #[test]
    fn test_keep_substantive_filters_small_docs() {
        let docs = vec![
            hit(Value::from(1), Some(4_000)),
            hit(Value::from(2), Some(5_000)),
            hit(Value::from(3), Some(5_001)),
            hit(Value::from(4), None),
        ];
        let kept = keep_substantive(docs);
        assert_eq!(kept.len(), 1);
        assert_eq!(coerce_id(&kept[0].tid).as_deref(), Some("3"));
    }

    #[test]
    fn test_document_to_case_numeric_tid() {
        let doc = KanoonDocument {
            doc: "<html><body><p>JUDGMENT</p><p>The appeal is allowed.</p></body></html>"
                .to_string(),
            tid: Value::from(48274),
            title: "Sharma v. Union of India".to_string(),
            docsource: "Supreme Court of India 2025".to_string(),
            publishdate: Some("14-09-2025".to_string()),
            author: Some("Chandrachud".to_string()),
            bench: Some("Chandrachud, Kaul".to_string()),
        };
        let case = document_to_case(&doc, fixed_now()).unwrap();
        assert_eq!(case.id, "48274");
        assert_eq!(case.url, "https://indiankanoon.org/doc/48274/");
        assert_eq!(case.court, "Supreme Court of India");
        assert_eq!(case.date, "2025-09-14T00:00:00.000Z");
        assert_eq!(case.parties.appellant.as_deref(), Some("Sharma"));
        assert_eq!(
            case.judges,
            Some(vec!["Chandrachud".to_string(), "Kaul".to_string()])
        );
        assert_eq!(
            case.raw_text.as_deref(),
            Some("JUDGMENT The appeal is allowed.")
        );
    }

    #[test]
    fn test_document_to_case_string_tid_matches_numeric() {
        let make = |tid: Value| KanoonDocument {
            doc: String::new(),
            tid,
            title: "A v. B".to_string(),
            docsource: "Delhi High Court".to_string(),
            publishdate: None,
            author: None,
            bench: None,
        };
        let numeric = document_to_case(&make(Value::from(7)), fixed_now()).unwrap();
        let string = document_to_case(&make(Value::from("7")), fixed_now()).unwrap();
        assert_eq!(numeric.id, string.id);
        assert_eq!(numeric.url, string.url);
    }

    #[test]
    fn test_document_to_case_rejects_null_tid() {
        let doc = KanoonDocument {
            doc: String::new(),
            tid: Value::Null,
            title: "A v. B".to_string(),
            docsource: "Delhi High Court".to_string(),
            publishdate: None,
            author: None,
            bench: None,
        };
        assert!(document_to_case(&doc, fixed_now()).is_none());
    }

    #[test]
    fn test_ddmmyyyy() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert_eq!(ddmmyyyy(date), "01-09-2025");
    }

    #[test]
    fn test_html_to_text_collapses_whitespace() {
        assert_eq!(
            html_to_text("<div>\n  <p>The appeal</p>\n  <p>is   allowed.</p>\n</div>"),
            "The appeal is allowed."
        );
    }
}
