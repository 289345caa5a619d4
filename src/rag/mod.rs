//! RAG (Retrieval-Augmented Generation) over the review corpus.
//!
//! Retrieves reviews relevant to a question, injects them into the prompt,
//! and asks the chat model for an answer grounded in them.

pub mod context;
mod response;

pub use context::{format_context_for_prompt, format_sources_for_display};
pub use response::{RagEngine, RagResponse};
