//! CourtListener opinions API.
//!
//! Pulls yesterday-and-newer opinions from the US federal appellate courts
//! through the public REST search endpoint. The API is optional: without an
//! API key the source logs a notice and contributes nothing to the run.

use crate::models::{Case, CaseSource, Jurisdiction};
use crate::normalize::{self, coerce_id, extract_parties, validate_case};
use crate::scrapers::FetchError;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

const API_BASE: &str = "https://www.courtlistener.com/api/rest/v3/opinions/";
const SITE_BASE: &str = "https://www.courtlistener.com";

/// Federal appellate courts of record: SCOTUS plus the circuit courts.
const FEDERAL_COURTS: &str = "scotus,ca1,ca2,ca3,ca4,ca5,ca6,ca7,ca8,ca9,ca10,ca11,cadc";

/// Cap on opinions taken per run.
const RESULT_CAP: usize = 20;

#[derive(Debug, Deserialize)]
struct OpinionsPage {
    #[serde(default)]
    results: Vec<Opinion>,
}

/// One opinion from the search endpoint. The id arrives numeric here but as
/// a string on other endpoints; both coerce to the same string id.
#[derive(Debug, Deserialize)]
struct Opinion {
    id: Value,
    #[serde(default)]
    case_name: Option<String>,
    #[serde(default)]
    court_name: Option<String>,
    #[serde(default)]
    date_filed: Option<String>,
    #[serde(default)]
    absolute_url: Option<String>,
}

/// Fetch recent federal opinions. Without an API key the source yields
/// nothing; any fetch failure is logged and yields an empty batch.
#[instrument(level = "info", skip_all)]
pub async fn fetch_recent(http: &reqwest::Client, api_key: Option<&str>) -> Vec<Case> {
    let Some(key) = api_key else {
        info!("CourtListener scraping will be available when an API key is configured");
        return Vec::new();
    };

    match fetch_page(http, key).await {
        Ok(cases) => {
            info!(count = cases.len(), "Scraped CourtListener opinions");
            cases
        }
        Err(e) => {
            warn!(error = %e, "CourtListener fetch failed; skipping source");
            Vec::new()
        }
    }
}

async fn fetch_page(http: &reqwest::Client, api_key: &str) -> Result<Vec<Case>, FetchError> {
    let filed_after = (Utc::now() - Duration::days(1))
        .date_naive()
        .format("%Y-%m-%d")
        .to_string();

    let response = http
        .get(API_BASE)
        .query(&[
            ("filed_after", filed_after.as_str()),
            ("court", FEDERAL_COURTS),
            ("order_by", "-date_filed"),
        ])
        .header("Authorization", format!("Token {}", api_key))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: API_BASE.to_string(),
        });
    }

    let page: OpinionsPage = response.json().await?;
    let mut cases = Vec::new();
    for opinion in page.results.into_iter().take(RESULT_CAP) {
        match opinion_to_case(&opinion) {
            Some(case) => cases.push(case),
            None => warn!("Dropping opinion with no usable id or title"),
        }
    }
    Ok(cases)
}

/// Map one opinion onto the canonical case shape.
fn opinion_to_case(opinion: &Opinion) -> Option<Case> {
    let id = coerce_id(&opinion.id)?;
    let title = opinion.case_name.as_deref()?.trim();

    let url = match opinion.absolute_url.as_deref() {
        Some(path) => resolve_site_url(path),
        None => format!("{}/opinion/{}/", SITE_BASE, id),
    };
    let date = opinion
        .date_filed
        .as_deref()
        .and_then(normalize::parse_feed_date)
        .unwrap_or_else(|| normalize::to_iso(Utc::now()));
    let court = opinion
        .court_name
        .clone()
        .unwrap_or_else(|| "Federal Court".to_string());

    let mut case = Case::unsummarized(
        Jurisdiction::US,
        court,
        date,
        extract_parties(title),
        CaseSource::CourtListener,
        url,
    );
    case.id = id;
    case.neutral_citation = normalize::extract_neutral_citation(title);
    validate_case(&case).ok()?;
    Some(case)
}

/// Resolve an API-relative path against the public site.
fn resolve_site_url(path: &str) -> String {
    Url::parse(SITE_BASE)
        .ok()
        .and_then(|base| base.join(path).ok())
        .map(|resolved| resolved.to_string())
        .unwrap_or_else(|| format!("{}{}", SITE_BASE, path))
}
