//! Token-window chunking of review documents.
//!
//! Each document is tokenized, truncated to a maximum input size, and cut
//! into overlapping windows. Every chunk carries a copy of its parent's
//! metadata plus its position within the document.

mod tokenizer;
mod window;

pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
pub use window::TokenChunker;

use crate::config::ChunkingSettings;
use crate::reviews::ReviewMetadata;
use serde::{Deserialize, Serialize};

/// A token-bounded slice of a review, ready for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text of this window.
    pub content: String,
    /// Metadata copied from the parent document.
    pub metadata: ReviewMetadata,
    /// Zero-based position of this window within its document.
    pub chunk_index: u32,
}

impl Chunk {
    pub fn new(content: String, metadata: ReviewMetadata, chunk_index: u32) -> Self {
        Self {
            content,
            metadata,
            chunk_index,
        }
    }

    /// The `(document_id, chunk_index)` pair identifying this chunk in the store.
    pub fn key(&self) -> (&str, u32) {
        (&self.metadata.document_id, self.chunk_index)
    }
}

/// Window policy for the chunker, in tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Size of each window.
    pub target_tokens: usize,
    /// Tokens shared by consecutive windows.
    pub overlap_tokens: usize,
    /// Windows shorter than this are discarded.
    pub min_tokens: usize,
    /// Inputs are truncated to this many tokens before windowing.
    pub max_input_tokens: usize,
    /// Reproduce the original separators when decoding a window.
    pub keep_separator: bool,
}

impl ChunkingConfig {
    /// Distance between the starts of consecutive windows.
    pub fn step(&self) -> usize {
        if self.target_tokens > self.overlap_tokens {
            self.target_tokens - self.overlap_tokens
        } else {
            self.target_tokens.max(1)
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_tokens: 500,
            overlap_tokens: 200,
            min_tokens: 10,
            max_input_tokens: 10_000,
            keep_separator: true,
        }
    }
}

impl From<&ChunkingSettings> for ChunkingConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            target_tokens: settings.target_tokens,
            overlap_tokens: settings.overlap_tokens,
            min_tokens: settings.min_tokens,
            max_input_tokens: settings.max_input_tokens,
            keep_separator: settings.keep_separator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let config = ChunkingConfig::default();
        assert_eq!(config.step(), 300);
        assert_eq!(config.min_tokens, 10);
        assert_eq!(config.max_input_tokens, 10_000);
        assert!(config.keep_separator);
    }

    #[test]
    fn test_step_when_overlap_not_smaller_than_target() {
        let config = ChunkingConfig {
            target_tokens: 10,
            overlap_tokens: 10,
            ..Default::default()
        };
        assert_eq!(config.step(), 10);
    }
}
