//! Context Retrieval
//!
//! The pipeline asks a [`ContextRetriever`] for a block of text relevant to a
//! query. An empty block means nothing relevant was found and is not an
//! error. [`ChromaRetriever`] is the Chroma-backed implementation.

pub mod chroma;

use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

use crate::chroma::ChromaError;

pub use chroma::ChromaRetriever;

/// Which part of the knowledge base to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceSelector {
    /// Textbooks and lecture notes
    Reference,
    /// Previous exam questions
    PastExam,
}

impl SourceSelector {
    pub fn from_flag(use_past_exam: bool) -> Self {
        if use_past_exam {
            SourceSelector::PastExam
        } else {
            SourceSelector::Reference
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSelector::Reference => "reference",
            SourceSelector::PastExam => "past_exam",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalQuery {
    /// Seed text; usually a HyDE passage
    pub text: String,
    pub subject: Option<String>,
    pub source: SourceSelector,
    pub top_k: u32,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>, subject: Option<&str>, source: SourceSelector, top_k: u32) -> Self {
        Self {
            text: text.into(),
            subject: subject.map(|s| s.to_string()),
            source,
            top_k,
        }
    }
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Chroma error: {0}")]
    Chroma(#[from] ChromaError),
    /// Failure reported by a `ContextRetriever` that is not backed by Chroma
    #[error("Retrieval failed: {0}")]
    Backend(String),
}

impl Serialize for RetrievalError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Anything that can turn a query into a block of context text
pub trait ContextRetriever: Send + Sync {
    fn retrieve(&self, query: &RetrievalQuery) -> impl Future<Output = Result<String, RetrievalError>> + Send;
}

impl<T: ContextRetriever> ContextRetriever for &T {
    fn retrieve(&self, query: &RetrievalQuery) -> impl Future<Output = Result<String, RetrievalError>> + Send {
        (**self).retrieve(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_from_flag() {
        assert_eq!(SourceSelector::from_flag(false), SourceSelector::Reference);
        assert_eq!(SourceSelector::from_flag(true), SourceSelector::PastExam);
        assert_eq!(SourceSelector::PastExam.as_str(), "past_exam");
    }

    #[test]
    fn test_query_new() {
        let query = RetrievalQuery::new("passage", Some("DBMS"), SourceSelector::Reference, 25);
        assert_eq!(query.subject.as_deref(), Some("DBMS"));
        assert_eq!(query.top_k, 25);
    }

    #[test]
    fn test_error_from_chroma() {
        let err: RetrievalError = ChromaError::ServerUnavailable.into();
        assert_eq!(err.to_string(), "Chroma error: Chroma server not available");
    }
}
