//! Chroma-backed retrieval
//!
//! Queries the reference or past-exam collection by text and joins the hits
//! into one context block. A missing or empty collection yields an empty
//! block rather than an error.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{ContextRetriever, RetrievalError, RetrievalQuery, SourceSelector};
use crate::chroma::{subject_filter, ChromaClient, ChromaConfig, ChromaError};

pub struct ChromaRetriever {
    client: ChromaClient,
    reference_collection: String,
    past_exam_collection: String,
    /// Collection name to id, filled on first successful lookup
    collection_ids: RwLock<HashMap<String, String>>,
}

impl ChromaRetriever {
    pub fn new(client: ChromaClient, config: &ChromaConfig) -> Self {
        Self {
            client,
            reference_collection: config.reference_collection.clone(),
            past_exam_collection: config.past_exam_collection.clone(),
            collection_ids: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &ChromaConfig) -> Result<Self, ChromaError> {
        Ok(Self::new(ChromaClient::new(config)?, config))
    }

    pub fn collection_for(&self, source: SourceSelector) -> &str {
        match source {
            SourceSelector::Reference => &self.reference_collection,
            SourceSelector::PastExam => &self.past_exam_collection,
        }
    }

    /// Id of a named collection. Misses are not cached, so a collection
    /// created mid-run is picked up by the next unit.
    async fn collection_id(&self, name: &str) -> Result<String, ChromaError> {
        let cached = self.collection_ids.read().get(name).cloned();
        if let Some(id) = cached {
            return Ok(id);
        }
        let collection = self.client.get_collection(name).await?;
        debug!(collection = %name, id = %collection.id, "Resolved collection");
        self.collection_ids.write().insert(name.to_string(), collection.id.clone());
        Ok(collection.id)
    }

    async fn search(&self, query: &RetrievalQuery) -> Result<String, ChromaError> {
        let name = self.collection_for(query.source);
        let collection_id = match self.collection_id(name).await {
            Ok(id) => id,
            Err(ChromaError::CollectionNotFound(_)) => {
                warn!(collection = %name, "Collection missing, using empty context");
                return Ok(String::new());
            }
            Err(e) => return Err(e),
        };

        let count = self.client.count(&collection_id).await?;
        if count == 0 || query.top_k == 0 {
            return Ok(String::new());
        }

        let filter = query.subject.as_deref().map(subject_filter);
        let result = self
            .client
            .query(
                &collection_id,
                std::slice::from_ref(&query.text),
                query.top_k.min(count), // Don't request more than exist
                filter,
            )
            .await?;

        let documents = result.documents_for(0);
        debug!(collection = %name, hits = documents.len(), "Chroma query results");
        Ok(join_documents(&documents))
    }
}

impl ContextRetriever for ChromaRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<String, RetrievalError> {
        let context = self.search(query).await?;
        info!(
            source = query.source.as_str(),
            top_k = query.top_k,
            chars = context.chars().count(),
            "Retrieved context"
        );
        Ok(context)
    }
}

/// Join passages with blank lines, keeping rank order
pub fn join_documents(documents: &[String]) -> String {
    documents
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}
