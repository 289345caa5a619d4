//! Vector store abstraction for Contrail.
//!
//! Provides a trait-based interface for different vector database backends,
//! a small boolean filter language over review metadata, and the gateway the
//! ingestion and query paths talk to.

pub mod filter;
mod gateway;
mod memory;
mod sqlite;

pub use filter::FilterExpr;
pub use gateway::{
    DocumentStore, SearchHit, SearchRequest, StoreGateway, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_TOP_K,
};
pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::chunking::Chunk;
use crate::config::{Settings, VectorStoreProvider};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A chunk together with its embedding, as held by a backend.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub chunk: Chunk,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was written.
    pub indexed_at: DateTime<Utc>,
}

impl StoredChunk {
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            chunk,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A stored chunk with its similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
///
/// Chunks are keyed by `(document_id, chunk_index)`; writing the same key
/// again replaces the previous entry.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk upsert chunks.
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize>;

    /// Search for the `limit` most similar chunks scoring at least
    /// `min_score` and matching `filter` when given.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredChunk>>;

    /// Get total chunk count.
    async fn chunk_count(&self) -> Result<usize>;
}

/// Create the vector store selected in the settings.
pub fn create_vector_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    let store: Arc<dyn VectorStore> = match settings.vector_store.provider {
        VectorStoreProvider::Sqlite => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
        VectorStoreProvider::Memory => Arc::new(MemoryVectorStore::new()),
    };
    Ok(store)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score candidates, keep those passing the threshold and filter, best first.
pub(crate) fn rank<'a, I>(
    candidates: I,
    query_embedding: &[f32],
    limit: usize,
    min_score: f32,
    filter: Option<&FilterExpr>,
) -> Vec<ScoredChunk>
where
    I: IntoIterator<Item = &'a StoredChunk>,
{
    let mut results: Vec<ScoredChunk> = candidates
        .into_iter()
        .filter(|stored| filter.map_or(true, |f| f.matches(&stored.chunk.metadata)))
        .map(|stored| ScoredChunk {
            chunk: stored.chunk.clone(),
            score: cosine_similarity(query_embedding, &stored.embedding),
        })
        .filter(|r| r.score >= min_score)
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}
