//! Chroma HTTP Client
//!
//! Direct HTTP client for the read side of Chroma's REST API. The knowledge
//! base is built elsewhere; this crate only checks health and queries.

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::retry::{with_retry, RetryPolicy, Retryable};

pub const DEFAULT_CHROMA_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REFERENCE_COLLECTION: &str = "books";
pub const DEFAULT_PAST_EXAM_COLLECTION: &str = "pyqs";

#[derive(Error, Debug)]
pub enum ChromaError {
    #[error("Chroma HTTP error: {0}")]
    Http(String),
    #[error("Chroma request timed out: {0}")]
    Timeout(String),
    #[error("Chroma returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    #[error("Chroma server not available")]
    ServerUnavailable,
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

impl Serialize for ChromaError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for ChromaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ChromaError::Timeout(e.to_string())
        } else {
            ChromaError::Http(e.to_string())
        }
    }
}

impl Retryable for ChromaError {
    fn is_retryable(&self) -> bool {
        match self {
            ChromaError::Http(_) | ChromaError::Timeout(_) | ChromaError::ServerUnavailable => true,
            ChromaError::Status { status, .. } => *status == 429 || *status >= 500,
            ChromaError::CollectionNotFound(_) | ChromaError::Deserialize(_) => false,
        }
    }
}

/// Chroma connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChromaConfig {
    pub base_url: String,
    /// Collection holding textbook and notes passages
    pub reference_collection: String,
    /// Collection holding previous exam questions
    pub past_exam_collection: String,
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CHROMA_URL.to_string(),
            reference_collection: DEFAULT_REFERENCE_COLLECTION.to_string(),
            past_exam_collection: DEFAULT_PAST_EXAM_COLLECTION.to_string(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}

/// Chroma collection info returned by API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    pub metadata: Option<Value>,
}

/// Result from a query operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromaQueryResult {
    pub ids: Vec<Vec<String>>,
    pub documents: Option<Vec<Vec<Option<String>>>>,
    pub metadatas: Option<Vec<Vec<Option<Value>>>>,
    pub distances: Option<Vec<Vec<f32>>>,
}

impl ChromaQueryResult {
    /// Documents for query `query_idx`, in rank order, skipping blanks
    pub fn documents_for(&self, query_idx: usize) -> Vec<String> {
        self.documents
            .as_ref()
            .and_then(|d| d.get(query_idx))
            .map(|docs| {
                docs.iter()
                    .flatten()
                    .filter(|doc| !doc.trim().is_empty())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Body for `POST /collections/{id}/query`
pub fn query_body(query_texts: &[String], n_results: u32, where_filter: Option<Value>) -> Value {
    let mut body = json!({
        "query_texts": query_texts,
        "n_results": n_results,
        "include": ["documents", "distances"],
    });
    if let Some(wf) = where_filter {
        body["where"] = wf;
    }
    body
}

/// Chroma HTTP client
#[derive(Clone)]
pub struct ChromaClient {
    http: Client,
    base_url: String,
    tenant: String,
    database: String,
    retry: RetryPolicy,
}

impl ChromaClient {
    pub fn new(config: &ChromaConfig) -> Result<Self, ChromaError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ChromaError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            retry: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v1/tenants/{}/databases/{}/collections",
            self.base_url, self.tenant, self.database
        )
    }

    /// Health check, returns nanosecond heartbeat if healthy
    pub async fn heartbeat(&self) -> Result<i64, ChromaError> {
        debug!("Chroma heartbeat check");
        let resp = self.http.get(format!("{}/api/v1/heartbeat", self.base_url)).send().await?;

        if !resp.status().is_success() {
            return Err(ChromaError::ServerUnavailable);
        }

        let body: Value = resp.json().await?;
        Ok(body["nanosecond heartbeat"].as_i64().unwrap_or(0))
    }

    /// Get a collection by name (read-only, does not create)
    pub async fn get_collection(&self, name: &str) -> Result<CollectionInfo, ChromaError> {
        let collections = self.list_collections().await?;
        collections
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ChromaError::CollectionNotFound(name.to_string()))
    }

    /// List all collections
    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>, ChromaError> {
        let url = &self.collections_url();
        let http = &self.http;
        with_retry(&self.retry, "chroma_list_collections", move || async move {
            let resp = http.get(url).send().await?;
            let resp = check_status(resp, "List collections").await?;
            resp.json().await.map_err(|e| ChromaError::Deserialize(e.to_string()))
        })
        .await
    }

    /// Query a collection by text; Chroma embeds the texts server-side
    pub async fn query(
        &self,
        collection_id: &str,
        query_texts: &[String],
        n_results: u32,
        where_filter: Option<Value>,
    ) -> Result<ChromaQueryResult, ChromaError> {
        let body = &query_body(query_texts, n_results, where_filter);
        let url = &format!("{}/api/v1/collections/{}/query", self.base_url, collection_id);
        let http = &self.http;

        debug!(collection = %collection_id, n_results = n_results, "Querying collection");
        with_retry(&self.retry, "chroma_query", move || async move {
            let resp = http.post(url).json(body).send().await?;
            let resp = check_status(resp, "Query").await?;
            resp.json().await.map_err(|e| ChromaError::Deserialize(e.to_string()))
        })
        .await
    }

    /// Count records in a collection
    pub async fn count(&self, collection_id: &str) -> Result<u32, ChromaError> {
        let url = &format!("{}/api/v1/collections/{}/count", self.base_url, collection_id);
        let http = &self.http;
        let result: u32 = with_retry(&self.retry, "chroma_count", move || async move {
            let resp = http.get(url).send().await?;
            let resp = check_status(resp, "Count").await?;
            resp.json().await.map_err(|e| ChromaError::Deserialize(e.to_string()))
        })
        .await?;
        debug!(collection = %collection_id, count = result, "Collection count");
        Ok(result)
    }
}

async fn check_status(resp: Response, what: &str) -> Result<Response, ChromaError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    error!(status = %status, body = %text, "{} failed", what);
    Err(ChromaError::Status {
        status: status.as_u16(),
        body: text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_body_without_filter() {
        let body = query_body(&["Explain joins".to_string()], 25, None);
        assert_eq!(body["query_texts"][0], "Explain joins");
        assert_eq!(body["n_results"], 25);
        assert_eq!(body["include"], json!(["documents", "distances"]));
        assert!(body.get("where").is_none());
    }

    #[test]
    fn test_query_body_with_filter() {
        let filter = json!({ "subject": { "$eq": "DBMS" } });
        let body = query_body(&["q".to_string()], 5, Some(filter.clone()));
        assert_eq!(body["where"], filter);
    }

    #[test]
    fn test_documents_in_rank_order() {
        let result: ChromaQueryResult = serde_json::from_value(json!({
            "ids": [["a", "b", "c", "d"]],
            "documents": [["first", null, "  ", "fourth"]],
            "distances": [[0.1, 0.2, 0.3, 0.4]]
        }))
        .unwrap();
        assert_eq!(result.documents_for(0), vec!["first", "fourth"]);
        assert!(result.documents_for(1).is_empty());
    }

    #[test]
    fn test_documents_missing() {
        let result = ChromaQueryResult::default();
        assert!(result.documents_for(0).is_empty());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(ChromaError::Http("reset".into()).is_retryable());
        assert!(ChromaError::ServerUnavailable.is_retryable());
        assert!(ChromaError::Status { status: 502, body: String::new() }.is_retryable());
        assert!(!ChromaError::Status { status: 400, body: String::new() }.is_retryable());
        assert!(!ChromaError::CollectionNotFound("books".into()).is_retryable());
    }

    #[test]
    fn test_config_defaults() {
        let config = ChromaConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.reference_collection, "books");
        assert_eq!(config.past_exam_collection, "pyqs");
        assert_eq!(config.timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_count_retries_transport_errors() {
        let config = ChromaConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            retry: RetryPolicy {
                max_attempts: 3,
                base_ms: 40,
                factor: 1.0,
                max_ms: 40,
            },
            ..Default::default()
        };
        let client = ChromaClient::new(&config).unwrap();

        let started = std::time::Instant::now();
        let err = client.count("missing-id").await.unwrap_err();
        assert!(err.is_retryable());
        // two backoffs of 40ms between three attempts
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ChromaConfig {
            base_url: "http://chroma.local:8000/".to_string(),
            ..Default::default()
        };
        let client = ChromaClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://chroma.local:8000");
    }
}
