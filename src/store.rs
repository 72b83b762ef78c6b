//! Hosted document store adapter.
//!
//! The pipeline treats the store (an Appwrite-style REST API) as an opaque
//! blob store: every document is `{ id, type, data }` where `data` is the
//! JSON-serialized record, scoped by database and collection id. Each write
//! attaches the same two access rules — public read, write restricted to the
//! server role — and an already-exists conflict counts as success, which is
//! what makes re-ingestion idempotent.
//!
//! Listing is offset-paginated at a fixed page size; a page shorter than the
//! page size (or empty) signals exhaustion. A flat delay sits between
//! successive write/delete calls and between list pages during sweeps to
//! respect the store's rate limits. No backoff.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Fixed page size for document listing.
pub const PAGE_SIZE: usize = 100;

/// Flat delay between successive write/delete calls.
const WRITE_DELAY: Duration = Duration::from_millis(100);

/// Flat delay between list pages during sweeps.
const PAGE_DELAY: Duration = Duration::from_millis(500);

/// Access rules attached to every document.
const DOCUMENT_PERMISSIONS: [&str; 2] = ["read(\"any\")", "write(\"team:server\")"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API endpoint, e.g. `https://cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub database_id: String,
    pub cases_collection: String,
    pub news_collection: String,
}

/// A document as the store returns it.
#[derive(Debug, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    /// The JSON-serialized record payload.
    #[serde(default)]
    pub data: String,
}

#[derive(Debug, Deserialize)]
struct DocumentPage {
    #[serde(default)]
    documents: Vec<StoredDocument>,
}

/// Result of an idempotent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    /// Unique-id conflict: the record is already stored. Success.
    AlreadyExists,
}

/// Counters from a batch write.
#[derive(Debug, Default)]
pub struct WriteStats {
    pub created: u64,
    pub conflicts: u64,
    pub failures: u64,
}

/// Server-authenticated client for one store project.
pub struct DocumentStore {
    http: reqwest::Client,
    config: StoreConfig,
}

impl DocumentStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint.trim_end_matches('/'),
            self.config.database_id,
            collection
        )
    }

    fn auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Key", &self.config.api_key)
    }

    /// Create one document with the standard access rules.
    ///
    /// A 409 from the store means a document with this id already exists;
    /// that is the duplicate-write path and is treated as success.
    #[instrument(level = "info", skip(self, payload), fields(collection, document_id))]
    pub async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        doc_type: &str,
        payload: &str,
    ) -> Result<WriteOutcome, StoreError> {
        let body = json!({
            "documentId": document_id,
            "data": {
                "id": document_id,
                "type": doc_type,
                "data": payload,
            },
            "permissions": DOCUMENT_PERMISSIONS,
        });
        let response = self
            .auth(self.http.post(self.collection_url(collection)))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if status.as_u16() == 409 {
            return Ok(WriteOutcome::AlreadyExists);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(WriteOutcome::Created)
    }

    /// Fetch one page of documents at the given offset.
    pub async fn list_page(
        &self,
        collection: &str,
        offset: usize,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let response = self
            .auth(self.http.get(self.collection_url(collection)))
            .query(&[
                ("queries[]", format!("limit({})", PAGE_SIZE)),
                ("queries[]", format!("offset({})", offset)),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }
        let page: DocumentPage = response.json().await?;
        Ok(page.documents)
    }

    /// Fetch every document in a collection, paging until a short page
    /// confirms exhaustion.
    #[instrument(level = "info", skip(self))]
    pub async fn list_all(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let mut all = Vec::new();
        let mut offset = 0usize;
        loop {
            let page = self.list_page(collection, offset).await?;
            let returned = page.len();
            all.extend(page);
            if page_exhausted(returned) {
                break;
            }
            offset += returned;
            sleep(PAGE_DELAY).await;
        }
        info!(collection, count = all.len(), "Listed all documents");
        Ok(all)
    }

    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let response = self.auth(self.http.delete(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Re-apply the standard access rules to one document.
    pub async fn update_permissions(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let body = json!({
            "data": {},
            "permissions": DOCUMENT_PERMISSIONS,
        });
        let response = self.auth(self.http.patch(&url)).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Collect the `url` field of every stored record in a collection, for
    /// dedup against the persisted set. Unparseable payloads are skipped.
    pub async fn existing_urls(&self, collection: &str) -> Result<HashSet<String>, StoreError> {
        let documents = self.list_all(collection).await?;
        let mut urls = HashSet::new();
        for doc in &documents {
            match payload_field(&doc.data, "url") {
                Some(url) => {
                    urls.insert(url);
                }
                None => warn!(id = %doc.id, "Stored document has no parseable url; skipped"),
            }
        }
        Ok(urls)
    }

    /// Write a batch of `(document_id, payload)` pairs with the flat
    /// inter-write delay. Per-document failures are logged and skipped.
    #[instrument(level = "info", skip(self, records), fields(collection, doc_type))]
    pub async fn write_records(
        &self,
        collection: &str,
        doc_type: &str,
        records: &[(String, String)],
    ) -> WriteStats {
        let mut stats = WriteStats::default();
        for (document_id, payload) in records {
            match self
                .create_document(collection, document_id, doc_type, payload)
                .await
            {
                Ok(WriteOutcome::Created) => stats.created += 1,
                Ok(WriteOutcome::AlreadyExists) => stats.conflicts += 1,
                Err(e) => {
                    stats.failures += 1;
                    error!(%document_id, error = %e, "Failed to store document");
                }
            }
            sleep(WRITE_DELAY).await;
        }
        info!(
            created = stats.created,
            conflicts = stats.conflicts,
            failures = stats.failures,
            "Batch write complete"
        );
        stats
    }

    /// Delete every record whose `date_field` is strictly older than the
    /// cutoff. Records at the boundary or newer are retained.
    ///
    /// Per-document parse or delete failures are logged and the sweep
    /// continues; a failed page ends the sweep early with the count so far.
    #[instrument(level = "info", skip(self, cutoff), fields(collection, date_field))]
    pub async fn sweep_older_than(
        &self,
        collection: &str,
        date_field: &str,
        cutoff: DateTime<Utc>,
    ) -> u64 {
        info!(cutoff = %cutoff.to_rfc3339(), "Starting retention sweep");
        let mut deleted = 0u64;
        let mut offset = 0usize;

        loop {
            let page = match self.list_page(collection, offset).await {
                Ok(page) => page,
                Err(e) => {
                    error!(error = %e, "Sweep page fetch failed; ending sweep");
                    break;
                }
            };
            if page.is_empty() {
                break;
            }

            let mut expired = Vec::new();
            for doc in &page {
                match payload_field(&doc.data, date_field) {
                    Some(date) => match older_than(&date, cutoff) {
                        Some(true) => expired.push(doc.id.clone()),
                        Some(false) => {}
                        None => {
                            warn!(id = %doc.id, %date, "Unparseable record date; skipped")
                        }
                    },
                    None => warn!(id = %doc.id, "Record has no date field; skipped"),
                }
            }

            for id in expired {
                match self.delete_document(collection, &id).await {
                    Ok(()) => {
                        deleted += 1;
                        info!(%id, "Deleted expired document");
                    }
                    Err(e) => error!(%id, error = %e, "Failed to delete document"),
                }
                sleep(WRITE_DELAY).await;
            }

            let returned = page.len();
            if page_exhausted(returned) {
                break;
            }
            offset += returned;
            sleep(PAGE_DELAY).await;
        }

        info!(deleted, "Retention sweep complete");
        deleted
    }

    /// Ensure every document in a collection carries the public-read rule.
    /// Returns `(processed, updated)`.
    #[instrument(level = "info", skip(self), fields(collection))]
    pub async fn backfill_permissions(&self, collection: &str) -> Result<(u64, u64), StoreError> {
        let mut processed = 0u64;
        let mut updated = 0u64;
        let mut offset = 0usize;

        loop {
            let page = self.list_page(collection, offset).await?;
            if page.is_empty() {
                break;
            }

            for doc in &page {
                processed += 1;
                if has_public_read(&doc.permissions) {
                    continue;
                }
                match self.update_permissions(collection, &doc.id).await {
                    Ok(()) => {
                        updated += 1;
                        info!(id = %doc.id, "Updated document permissions");
                    }
                    Err(e) => error!(id = %doc.id, error = %e, "Failed to update permissions"),
                }
                sleep(WRITE_DELAY).await;
            }

            let returned = page.len();
            if page_exhausted(returned) {
                break;
            }
            offset += returned;
            sleep(PAGE_DELAY).await;
        }

        info!(processed, updated, "Permission backfill complete");
        Ok((processed, updated))
    }
}

/// Pagination termination: a short or empty page means the collection is
/// exhausted.
pub fn page_exhausted(returned: usize) -> bool {
    returned < PAGE_SIZE
}

/// Whether a record date is strictly older than the cutoff. `None` when the
/// date cannot be parsed.
pub fn older_than(date: &str, cutoff: DateTime<Utc>) -> Option<bool> {
    DateTime::parse_from_rfc3339(date)
        .ok()
        .map(|dt| dt.with_timezone(&Utc) < cutoff)
}

/// Pull one string field out of a JSON-serialized record payload.
fn payload_field(data: &str, field: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    value.get(field)?.as_str().map(str::to_string)
}

fn has_public_read(permissions: &[String]) -> bool {
    permissions.iter().any(|p| p == "read(\"any\")")
}
