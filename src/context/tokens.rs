//! Token counting using tiktoken-rs.
//!
//! Uses cl100k_base, which is close enough to the Llama tokenizers served
//! by Groq for sizing prompts in logs and warnings.

use lazy_static::lazy_static;
use tiktoken_rs::{cl100k_base, CoreBPE};

lazy_static! {
    static ref BPE: Option<CoreBPE> = cl100k_base().ok();
}

/// Count tokens in text. Falls back to the quick estimate if the encoder
/// could not be loaded.
pub fn count_tokens(text: &str) -> u32 {
    if text.is_empty() {
        return 0;
    }
    match BPE.as_ref() {
        Some(bpe) => bpe.encode_with_special_tokens(text).len() as u32,
        None => estimate_tokens_quick(text),
    }
}

/// Token count of a system + user prompt pair
pub fn prompt_tokens(system: &str, user: &str) -> u32 {
    count_tokens(system) + count_tokens(user)
}

/// ~4 chars per token
pub fn estimate_tokens_quick(text: &str) -> u32 {
    (text.chars().count() as f64 / 4.0).ceil() as u32
}
