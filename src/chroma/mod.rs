//! Chroma Vector Database Integration
//!
//! Read-only access to a running Chroma server holding the reference and
//! past-exam collections.

pub mod client;
pub mod collections;

pub use client::{ChromaClient, ChromaConfig, ChromaError, ChromaQueryResult, CollectionInfo};
pub use collections::{get_collection_status, subject_filter, CollectionStatus};
