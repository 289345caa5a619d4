//! Ingestion: CSV reviews to chunks to the vector store.

mod writer;

pub use writer::{BatchProgress, BatchWriter, DEFAULT_BATCH_SIZE};

use crate::chunking::{Chunk, TokenChunker};
use crate::error::Result;
use crate::reviews::{read_documents, Document, ReviewReader};
use crate::vector_store::DocumentStore;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument};

/// Summary of an ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub batches: usize,
    pub elapsed: Duration,
}

/// Reads, splits and stores reviews.
pub struct Ingestor {
    chunker: TokenChunker,
    writer: BatchWriter,
}

impl Ingestor {
    pub fn new(store: Arc<dyn DocumentStore>, chunker: TokenChunker) -> Self {
        Self {
            chunker,
            writer: BatchWriter::new(store),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.writer = self.writer.with_batch_size(batch_size);
        self
    }

    /// Read up to `limit` documents from the CSV at `path`.
    #[instrument(skip(self))]
    pub fn read(&self, path: &Path, limit: Option<usize>) -> Result<Vec<Document>> {
        let reader = ReviewReader::open(path)?;
        let documents = read_documents(reader, limit)?;
        info!("Read {} documents from {:?}", documents.len(), path);
        Ok(documents)
    }

    /// Split documents into chunks, in document order.
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks = self.chunker.chunk_all(documents);
        info!("Split {} documents into {} chunks", documents.len(), chunks.len());
        chunks
    }

    /// Write chunks in batches. Returns the number of batches.
    pub async fn store<F>(&self, chunks: &[Chunk], on_batch: F) -> Result<usize>
    where
        F: FnMut(&BatchProgress),
    {
        self.writer.write_all(chunks, on_batch).await
    }

    /// Run all three steps.
    pub async fn run<F>(
        &self,
        path: &Path,
        limit: Option<usize>,
        on_batch: F,
    ) -> Result<IngestReport>
    where
        F: FnMut(&BatchProgress),
    {
        let start = Instant::now();
        let documents = self.read(path, limit)?;
        let chunks = self.split(&documents);
        let batches = self.store(&chunks, on_batch).await?;

        Ok(IngestReport {
            documents: documents.len(),
            chunks: chunks.len(),
            batches,
            elapsed: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkingConfig;
    use crate::embedding::HashingEmbedder;
    use crate::error::ContrailError;
    use crate::vector_store::{MemoryVectorStore, SearchRequest, StoreGateway};
    use std::io::Write;

    const HEADER: &str = "idx,airline_name,overall_rating,review_title,a,b,review,c,d,seat_type,route,e,f,g,h,i,j,k,l,recommended";

    fn csv_file(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file
    }

    fn row(airline: &str, title: &str, body: &str) -> String {
        format!("0,{},7,{},,,{},,,Economy Class,LHR-CDG,,,,,,,,,yes", airline, title, body)
    }

    fn gateway() -> Arc<StoreGateway> {
        Arc::new(StoreGateway::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(128)),
        ))
    }

    #[tokio::test]
    async fn test_end_to_end_ingest_then_search() {
        let rows = [
            row("Delta", "Smooth", "Friendly crew and a smooth landing in heavy rain at night."),
            row("United", "", "Lost my bag at the transfer and nobody at the desk could help."),
            row("KLM", "Meh", ""),
            row("Ryanair", "", "Fine."),
        ];
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let file = csv_file(&rows);

        let gateway = gateway();
        let ingestor = Ingestor::new(gateway.clone(), TokenChunker::default());
        let mut batches = Vec::new();
        let report = ingestor.run(file.path(), None, |p| batches.push(*p)).await.unwrap();

        // The empty KLM body is dropped; the two-word Ryanair review is below
        // the chunk minimum and yields no chunk.
        assert_eq!(report.documents, 3);
        assert_eq!(report.chunks, 2);
        assert_eq!(report.batches, 1);
        assert_eq!(batches.len(), 1);
        assert_eq!(gateway.chunk_count().await.unwrap(), 2);

        let hits = gateway
            .search(&SearchRequest::new(
                "Lost my bag at the transfer and nobody at the desk could help.",
            ))
            .await
            .unwrap();
        assert_eq!(hits[0].document.metadata.document_id, "id-1");
    }

    #[tokio::test]
    async fn test_reingest_offers_same_keys() {
        let body = (0..40).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
        let rows = [row("Qantas", "", &body), row("Jetstar", "", "Cheap and cheerful.")];
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let file = csv_file(&rows);

        let chunker = TokenChunker::new(ChunkingConfig {
            target_tokens: 20,
            overlap_tokens: 5,
            min_tokens: 2,
            max_input_tokens: 1000,
            keep_separator: true,
        });
        let gateway = gateway();
        let ingestor = Ingestor::new(gateway.clone(), chunker);

        let first = ingestor.split(&ingestor.read(file.path(), None).unwrap());
        let second = ingestor.split(&ingestor.read(file.path(), None).unwrap());
        let keys = |chunks: &[Chunk]| {
            chunks
                .iter()
                .map(|c| (c.metadata.document_id.clone(), c.chunk_index))
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(&first), keys(&second));
        assert!(first.len() > 2);

        ingestor.store(&first, |_| {}).await.unwrap();
        ingestor.store(&second, |_| {}).await.unwrap();
        assert_eq!(gateway.chunk_count().await.unwrap(), first.len());
    }

    #[tokio::test]
    async fn test_limit_is_honored() {
        let rows: Vec<String> = (0..5)
            .map(|i| row("Delta", "", &format!("Review number {}", i)))
            .collect();
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        let file = csv_file(&rows);

        let ingestor = Ingestor::new(gateway(), TokenChunker::default());
        let report = ingestor.run(file.path(), Some(3), |_| {}).await.unwrap();
        assert_eq!(report.documents, 3);
    }

    #[tokio::test]
    async fn test_missing_csv() {
        let ingestor = Ingestor::new(gateway(), TokenChunker::default()).with_batch_size(10);
        let err = ingestor
            .run(Path::new("/nonexistent/airline_review.csv"), None, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ContrailError::InputMissing(_)));
    }
}
