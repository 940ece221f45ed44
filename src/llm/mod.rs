//! Chat Completion Layer
//!
//! The pipeline talks to language models only through [`CompletionClient`].
//! [`ChatClient`] is the OpenAI-compatible HTTP implementation (Groq by
//! default).

pub mod client;
pub mod openai;

pub use client::{CompletionClient, CompletionRequest, LlmError};
pub use openai::{ChatClient, LlmConfig, DEFAULT_LLM_URL, DEFAULT_HYDE_MODEL, DEFAULT_NOTES_MODEL};
