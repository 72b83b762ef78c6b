//! LLM case summarization behind a swappable provider seam.
//!
//! The pipeline never talks to a model API directly: it goes through the
//! [`Summarize`] trait, so the provider can be swapped without touching the
//! rest of the pipeline. Two implementations exist:
//!
//! - [`GeminiSummarizer`]: calls the Gemini `generateContent` endpoint with
//!   four prompts per case (TL;DR, structured brief, key quotes, tags)
//! - [`MockSummarizer`]: a deterministic template used when no API key is
//!   configured, and the fallback when a live call fails
//!
//! Model output is free text, so the section and quote parsers here are
//! best-effort: they extract content between recognized labels in a fixed
//! order and default anything unrecognized to empty.

use crate::models::{Brief5Min, Case, KeyQuote};
use crate::normalize::{synthesize_case_id, to_iso};
use crate::utils::truncate_for_log;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Cap on quotes kept per case.
const KEY_QUOTE_CAP: usize = 3;

const TLDR_PROMPT: &str = "You are 5 Min Case AI. Your personality is sharp, witty, and \
conversational like a senior lawyer explaining to a junior over coffee.\n\n\
Generate a TL;DR in EXACTLY 60 words following this format:\n\
[WHO] held that [WHAT] because [WHY]. This means [PRACTICAL IMPACT].\n\n\
Rules:\n\
- Use plain English, NO legal jargon\n\
- Lead with the most important holding\n\
- Be specific about the impact";

const BRIEF_PROMPT: &str = "You are 5 Min Case AI. Create a structured 5-minute brief that a \
tired lawyer can understand quickly.\n\n\
Structure:\n\
1. FACTS: What happened? (2-3 sentences max)\n\
2. ISSUES: What legal questions did the court answer?\n\
3. HOLDING: Court's answer in one clear sentence\n\
4. REASONING: Why did the court decide this way? (2-3 sentences)\n\
5. DISPOSITION: What happens next? (1 sentence)\n\n\
Rules:\n\
- NO legal jargon or complex language\n\
- Focus on what matters for practice";

const KEY_QUOTES_PROMPT: &str = "Extract 2-3 powerful quotes from this judgment that lawyers \
would highlight.\n\n\
Rules:\n\
- Pick quotes that capture the essence of the ruling\n\
- Include paragraph/page reference if available\n\
- Avoid procedural language";

const TAGS_PROMPT: &str = "Identify 2-3 practice areas for this case.\n\n\
Common tags: Criminal Procedure, Constitutional, Commercial, Arbitration, IPR, Data Protection, \
Administrative, Tax, Labour, Family, Property, Torts, Contract, Media, Banking, Insurance, \
Environmental, Competition, Securities\n\n\
Return only the relevant tags as a comma-separated list.";

static SECTION_LABEL_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["facts", "issues", "holding", "reasoning", "disposition"]
        .iter()
        .map(|label| Regex::new(&format!(r"(?i)\b{}\b\s*:?", label)).unwrap())
        .collect()
});

static QUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"(?:\s*(?:\(|¶|para?\.?\s*)(\d+)\)?)?"#).unwrap());

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model returned no text")]
    EmptyResponse,
}

/// Everything the summarization step adds to a case.
#[derive(Debug, Clone)]
pub struct CaseSummary {
    pub tldr60: String,
    pub brief5min: Brief5Min,
    pub key_quotes: Vec<KeyQuote>,
    pub tags: Vec<String>,
}

/// Provider seam for case summarization.
pub trait Summarize {
    async fn summarize(&self, case: &Case) -> Result<CaseSummary, SummarizeError>;
}

/// The configured provider for a run: a live model when a key is present,
/// the deterministic mock otherwise.
pub enum Provider {
    Gemini(GeminiSummarizer),
    Mock(MockSummarizer),
}

impl Provider {
    pub fn from_api_key(api_key: Option<String>) -> Self {
        match api_key {
            Some(key) => Provider::Gemini(GeminiSummarizer::new(key)),
            None => {
                warn!("No model API key configured; using mock summaries");
                Provider::Mock(MockSummarizer)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini(_) => "gemini",
            Provider::Mock(_) => "mock",
        }
    }
}

impl Summarize for Provider {
    async fn summarize(&self, case: &Case) -> Result<CaseSummary, SummarizeError> {
        match self {
            Provider::Gemini(inner) => inner.summarize(case).await,
            Provider::Mock(inner) => inner.summarize(case).await,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Gemini-backed provider. Four `generateContent` calls per case, no
/// retries; a failed case falls back to the mock at the caller.
pub struct GeminiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiSummarizer {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: GEMINI_MODEL.to_string(),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        let response = self.http.post(&url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Api {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }
        let parsed: GenerateResponse = response.json().await.map_err(SummarizeError::Http)?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .ok_or(SummarizeError::EmptyResponse)
    }
}

impl Summarize for GeminiSummarizer {
    #[instrument(level = "info", skip_all, fields(title = %case.parties.title))]
    async fn summarize(&self, case: &Case) -> Result<CaseSummary, SummarizeError> {
        let subject = case_subject(case);

        let tldr60 = self
            .generate(&format!("{}\n\n{}", TLDR_PROMPT, subject))
            .await?;
        let brief_text = self
            .generate(&format!("{}\n\n{}\nTL;DR: {}", BRIEF_PROMPT, subject, tldr60))
            .await?;
        let quotes_text = self
            .generate(&format!("{}\n\n{}", KEY_QUOTES_PROMPT, subject))
            .await?;
        let tags_text = self
            .generate(&format!("{}\n\n{}\nTL;DR: {}", TAGS_PROMPT, subject, tldr60))
            .await?;

        Ok(CaseSummary {
            tldr60,
            brief5min: parse_brief_sections(&brief_text),
            key_quotes: parse_key_quotes(&quotes_text),
            tags: parse_tags(&tags_text),
        })
    }
}

/// Deterministic summary used without an API key and as the per-case
/// fallback when a live call fails.
pub struct MockSummarizer;

impl Summarize for MockSummarizer {
    async fn summarize(&self, _case: &Case) -> Result<CaseSummary, SummarizeError> {
        Ok(mock_summary())
    }
}

fn mock_summary() -> CaseSummary {
    CaseSummary {
        tldr60: "Court ruled that AI-generated legal summaries require human review before \
                 reliance. Automated tools can assist but cannot replace lawyer judgment. \
                 Sanctions possible for unchecked AI submissions. This means lawyers must \
                 verify AI output before filing, treating it like junior associate work \
                 requiring supervision."
            .to_string(),
        brief5min: Brief5Min {
            facts: "Law firm submitted AI-generated brief with hallucinated cases. Opposing \
                    counsel discovered fake citations. Court sanctioned firm for lack of \
                    diligence."
                .to_string(),
            issues: "Whether lawyers can rely on AI tools without verification. What level of \
                     review satisfies professional duties."
                .to_string(),
            holding: "Lawyers remain fully responsible for AI-generated content and must verify \
                      all citations and arguments."
                .to_string(),
            reasoning: "Professional responsibility rules require personal knowledge of filing \
                        contents. AI tools are assistants, not replacements for legal judgment."
                .to_string(),
            disposition: "Sanctions imposed; brief stricken; leave to refile with verified \
                          content."
                .to_string(),
        },
        key_quotes: vec![
            KeyQuote {
                quote: "AI is a tool, not a lawyer. The professional using it remains \
                        accountable."
                    .to_string(),
                pin: Some("¶45".to_string()),
            },
            KeyQuote {
                quote: "Technological efficiency cannot compromise accuracy or candor before \
                        this Court."
                    .to_string(),
                pin: Some("¶62".to_string()),
            },
        ],
        tags: vec![
            "Professional Responsibility".to_string(),
            "Legal Tech".to_string(),
            "Litigation".to_string(),
        ],
    }
}

fn case_subject(case: &Case) -> String {
    format!(
        "Case: {}\nCourt: {}\nDate: {}\nURL: {}",
        case.parties.title, case.court, case.date, case.url
    )
}

/// Summarize one raw case and assemble the completed record.
///
/// A live-provider failure falls back to the mock summary rather than
/// failing the batch. Cases without a source id get a synthesized one, and
/// the judgment text is dropped from the finished record.
pub async fn process_case<S: Summarize>(provider: &S, mut case: Case, now: DateTime<Utc>) -> Case {
    let summary = match provider.summarize(&case).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!(title = %case.parties.title, error = %e, "Summarization failed; using mock summary");
            mock_summary()
        }
    };

    if case.id.is_empty() {
        case.id = synthesize_case_id(&case.date, &case.court);
    }
    case.tldr60 = summary.tldr60;
    case.brief5min = summary.brief5min;
    case.key_quotes = summary.key_quotes;
    case.tags = summary.tags;
    case.raw_text = None;
    let stamp = to_iso(now);
    case.created_at = Some(stamp.clone());
    case.updated_at = Some(stamp);

    info!(id = %case.id, "Summarized case");
    case
}

/// Extract the five brief sections from free-form model output.
///
/// Labels are searched in fixed order (FACTS, ISSUES, HOLDING, REASONING,
/// DISPOSITION), case-insensitively; each section spans from its label to
/// the next found label. Missing sections stay empty.
pub fn parse_brief_sections(text: &str) -> Brief5Min {
    let mut spans: Vec<Option<(usize, usize)>> = Vec::with_capacity(SECTION_LABEL_RES.len());
    let mut search_from = 0usize;
    for re in SECTION_LABEL_RES.iter() {
        match re.find_at(text, search_from) {
            Some(m) => {
                spans.push(Some((m.start(), m.end())));
                search_from = m.end();
            }
            None => spans.push(None),
        }
    }

    let mut sections = vec![String::new(); spans.len()];
    for (i, span) in spans.iter().enumerate() {
        if let Some((_, content_start)) = span {
            let content_end = spans[i + 1..]
                .iter()
                .flatten()
                .map(|(start, _)| *start)
                .next()
                .unwrap_or(text.len());
            sections[i] = text[*content_start..content_end].trim().to_string();
        }
    }

    Brief5Min {
        facts: std::mem::take(&mut sections[0]),
        issues: std::mem::take(&mut sections[1]),
        holding: std::mem::take(&mut sections[2]),
        reasoning: std::mem::take(&mut sections[3]),
        disposition: std::mem::take(&mut sections[4]),
    }
}

/// Pull quoted passages with optional paragraph pins out of model output,
/// capped at three.
pub fn parse_key_quotes(text: &str) -> Vec<KeyQuote> {
    QUOTE_RE
        .captures_iter(text)
        .map(|caps| KeyQuote {
            quote: caps[1].to_string(),
            pin: caps.get(2).map(|pin| format!("¶{}", pin.as_str())),
        })
        .take(KEY_QUOTE_CAP)
        .collect()
}

/// Split a comma-separated tag list.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
