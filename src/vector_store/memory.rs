//! In-memory vector store implementation.
//!
//! Useful for testing and for one-shot runs where nothing needs to persist.

use super::{rank, FilterExpr, ScoredChunk, StoredChunk, VectorStore};
use crate::error::{ContrailError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

type ChunkKey = (String, u32);

/// In-memory vector store.
pub struct MemoryVectorStore {
    chunks: RwLock<BTreeMap<ChunkKey, StoredChunk>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> ContrailError {
    ContrailError::StoreUnavailable(format!("memory store lock poisoned: {}", e))
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert_batch(&self, chunks: &[StoredChunk]) -> Result<usize> {
        let mut store = self.chunks.write().map_err(poisoned)?;
        for stored in chunks {
            let (document_id, chunk_index) = stored.chunk.key();
            store.insert((document_id.to_string(), chunk_index), stored.clone());
        }
        Ok(chunks.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<ScoredChunk>> {
        let store = self.chunks.read().map_err(poisoned)?;
        Ok(rank(store.values(), query_embedding, limit, min_score, filter))
    }

    async fn chunk_count(&self) -> Result<usize> {
        Ok(self.chunks.read().map_err(poisoned)?.len())
    }
}
