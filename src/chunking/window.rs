//! Overlapping token-window chunker.

use super::{Chunk, ChunkingConfig, Tokenizer, WhitespaceTokenizer};
use crate::reviews::Document;
use tracing::debug;

/// Splits documents into overlapping token windows.
pub struct TokenChunker {
    config: ChunkingConfig,
    tokenizer: Box<dyn Tokenizer>,
}

impl TokenChunker {
    /// Create a chunker using the whitespace tokenizer.
    pub fn new(config: ChunkingConfig) -> Self {
        Self::with_tokenizer(config, Box::new(WhitespaceTokenizer))
    }

    pub fn with_tokenizer(config: ChunkingConfig, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self { config, tokenizer }
    }

    /// Cut text into window strings.
    ///
    /// Windows start every `step()` tokens and the last window ends at the
    /// (truncated) end of the input. Any window shorter than `min_tokens` is
    /// dropped, including the only window of a short text.
    pub fn windows(&self, text: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize(text);
        let limit = tokens.len().min(self.config.max_input_tokens);
        let tokens = &tokens[..limit];

        if tokens.is_empty() {
            return Vec::new();
        }

        let target = self.config.target_tokens.max(1);
        let step = self.config.step();
        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + target).min(tokens.len());
            let window = &tokens[start..end];

            if window.len() >= self.config.min_tokens {
                windows.push(self.decode(window));
            } else {
                debug!(tokens = window.len(), "Discarded short window");
            }

            if end == tokens.len() {
                break;
            }
            start += step;
        }

        windows
    }

    /// Split one document into chunks carrying its metadata.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        self.windows(&document.content)
            .into_iter()
            .filter(|content| !content.is_empty())
            .enumerate()
            .map(|(i, content)| Chunk::new(content, document.metadata.clone(), i as u32))
            .collect()
    }

    /// Split documents in order, preserving window order within each.
    pub fn chunk_all(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents.iter().flat_map(|doc| self.chunk(doc)).collect();
        debug!(
            "Chunked {} documents into {} chunks (target: {}, overlap: {})",
            documents.len(),
            chunks.len(),
            self.config.target_tokens,
            self.config.overlap_tokens
        );
        chunks
    }

    fn decode(&self, tokens: &[&str]) -> String {
        if self.config.keep_separator {
            tokens.concat().trim_end().to_string()
        } else {
            tokens
                .iter()
                .map(|t| t.trim_end())
                .collect::<Vec<_>>()
                .join(" ")
        }
    }
}

impl Default for TokenChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}
