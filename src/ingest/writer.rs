//! Sequential batched writes to the document store.

use crate::chunking::Chunk;
use crate::error::Result;
use crate::vector_store::DocumentStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Default number of chunks per `add` call.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Progress of a batched write, reported after each committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// One-based batch number.
    pub batch: usize,
    /// Chunks in this batch.
    pub size: usize,
    /// Chunks committed so far, this batch included.
    pub written: usize,
    pub total: usize,
}

/// Writes chunks in fixed-size batches, in input order.
///
/// There are no retries. The first failing batch aborts the write; batches
/// committed before it stay in the store.
pub struct BatchWriter {
    store: Arc<dyn DocumentStore>,
    batch_size: usize,
}

impl BatchWriter {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Write all chunks, calling `on_batch` after each batch commits.
    /// Returns the number of batches written.
    pub async fn write_all<F>(&self, chunks: &[Chunk], mut on_batch: F) -> Result<usize>
    where
        F: FnMut(&BatchProgress),
    {
        let total = chunks.len();
        let mut written = 0;
        let mut batches = 0;

        for (i, batch) in chunks.chunks(self.batch_size).enumerate() {
            debug!("Writing batch {} ({} chunks)", i + 1, batch.len());
            self.store.add(batch).await?;

            written += batch.len();
            batches += 1;
            on_batch(&BatchProgress {
                batch: i + 1,
                size: batch.len(),
                written,
                total,
            });
        }

        info!("Wrote {} chunks in {} batches", written, batches);
        Ok(batches)
    }
}
