//! Utility functions for text cleanup, string manipulation, and file system
//! operations.
//!
//! This module provides helper functions used throughout the pipeline:
//! - HTML stripping and whitespace collapsing for feed summaries
//! - Title normalization for batch-level deduplication
//! - String truncation for logging
//! - File system validation for output directories

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use tokio::fs;
use tracing::{info, instrument};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Maximum length of a cleaned news summary, ellipsis included.
pub const SUMMARY_MAX_LEN: usize = 300;

/// Strip HTML tags from a string and collapse runs of whitespace.
///
/// Feed `description`/`content` fields routinely carry markup; the reader
/// only ever shows plain text.
pub fn strip_html(content: &str) -> String {
    let without_tags = TAG_RE.replace_all(content, "");
    WS_RE.replace_all(&without_tags, " ").trim().to_string()
}

/// Clean a feed summary: strip tags, collapse whitespace, and truncate to
/// `max_len` characters with a trailing `"..."`.
///
/// Truncation counts characters, not bytes, so multi-byte judgments ("¶",
/// Devanagari party names) never split mid-character.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_summary("<p>short</p>", 300), "short");
/// assert_eq!(clean_summary(&"a".repeat(400), 300).len(), 300);
/// ```
pub fn clean_summary(content: &str, max_len: usize) -> String {
    let clean = strip_html(content);
    if clean.chars().count() > max_len {
        let cut: String = clean.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        clean
    }
}

/// Normalize a title for duplicate detection: lowercase it and drop every
/// non-alphanumeric character.
///
/// Two syndicated copies of the same story ("SC Stays Demolition Order!" vs
/// "SC stays demolition order") collapse to the same key.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` bytes with an ellipsis and byte count
/// indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
    }
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if it doesn't exist, then performs a write test by
/// creating and immediately deleting a probe file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or is not writable
/// (permission denied, read-only filesystem, etc.).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn ensure_writable_dir(path: &str) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = format!("{}/..__probe_write__", path.trim_end_matches('/'));
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
