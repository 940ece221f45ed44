//! Chroma Collection Helpers
//!
//! Collection naming, metadata filters and status reporting for the
//! knowledge base collections this crate reads from.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

use super::client::{ChromaClient, ChromaConfig, ChromaError};

/// Collection status info
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStatus {
    pub name: String,
    pub exists: bool,
    pub record_count: u32,
}

/// Names of every collection the retriever may query
pub fn configured_collections(config: &ChromaConfig) -> Vec<&str> {
    let mut names = vec![config.reference_collection.as_str()];
    if config.past_exam_collection != config.reference_collection {
        names.push(config.past_exam_collection.as_str());
    }
    names
}

/// Get status of the configured collections
pub async fn get_collection_status(
    client: &ChromaClient,
    config: &ChromaConfig,
) -> Result<Vec<CollectionStatus>, ChromaError> {
    let existing: HashMap<String, String> = client
        .list_collections()
        .await?
        .into_iter()
        .map(|c| (c.name, c.id))
        .collect();

    let mut statuses = Vec::new();
    for name in configured_collections(config) {
        let record_count = match existing.get(name) {
            Some(id) => client.count(id).await.unwrap_or(0),
            None => 0,
        };
        statuses.push(CollectionStatus {
            name: name.to_string(),
            exists: existing.contains_key(name),
            record_count,
        });
    }

    debug!(count = statuses.len(), "Got collection statuses");
    Ok(statuses)
}

/// Build a subject-scoped where filter
pub fn subject_filter(subject: &str) -> Value {
    json!({ "subject": { "$eq": subject } })
}
