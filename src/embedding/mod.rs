//! Embedding generation for review chunks and search queries.

mod hashing;
mod openai;

pub use hashing::HashingEmbedder;
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder selected in the settings.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let dimensions = settings.embedding.dimensions as usize;
    let embedder: Arc<dyn Embedder> = match settings.embedding.provider {
        EmbeddingProvider::OpenAI => Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            dimensions,
            &settings.openai,
        )?),
        EmbeddingProvider::Hashing => Arc::new(HashingEmbedder::new(dimensions)),
    };
    Ok(embedder)
}
