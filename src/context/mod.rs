//! Context Management Module
//!
//! Bounds the retrieved text that goes into prompts and measures prompt size.

pub mod budget;
pub mod tokens;
pub mod truncate;

pub use budget::{
    RetrievalBudget, DEFAULT_RAG_TOP_K, DEFAULT_TOP_K, PAST_EXAM_TOP_K, REFERENCE_MAX_CHARS,
    REFERENCE_TOP_K_CAP,
};
pub use tokens::{count_tokens, estimate_tokens_quick, prompt_tokens};
pub use truncate::{truncate_context, TRUNCATION_MARKER};
