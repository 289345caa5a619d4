//! The document-level face of the vector store.
//!
//! Ingestion hands chunks to [`DocumentStore::add`]; retrieval asks
//! [`DocumentStore::search`]. [`StoreGateway`] embeds text on the way in,
//! parses filter expressions, and reports failures as either
//! `StoreUnavailable` or `StoreRejected`.

use super::{filter, StoredChunk, VectorStore};
use crate::chunking::Chunk;
use crate::embedding::Embedder;
use crate::error::{ContrailError, Result};
use crate::reviews::{Document, ReviewMetadata};
use async_trait::async_trait;
use rusqlite::ErrorCode;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Default number of hits per search.
pub const DEFAULT_TOP_K: usize = 5;

/// Default minimum cosine similarity.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// A similarity search over stored chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub similarity_threshold: f32,
    /// Boolean filter over metadata; empty means no filter.
    pub filter_expression: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            filter_expression: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Attach a filter. An empty expression leaves the request unfiltered.
    pub fn with_filter(mut self, expression: impl Into<String>) -> Self {
        let expression = expression.into();
        self.filter_expression = if expression.trim().is_empty() {
            None
        } else {
            Some(expression)
        };
        self
    }
}

/// A document returned by a search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: Document,
    /// Window position of the matching chunk within its review.
    pub chunk_index: u32,
    /// Cosine similarity to the query.
    pub score: f32,
}

impl SearchHit {
    pub fn metadata(&self) -> &ReviewMetadata {
        &self.document.metadata
    }
}

/// Store of review chunks that can be searched by meaning.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Embed and insert a batch of chunks.
    async fn add(&self, chunks: &[Chunk]) -> Result<()>;

    /// Run a similarity search.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>>;
}

/// [`DocumentStore`] backed by an embedder and a [`VectorStore`].
pub struct StoreGateway {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
}

impl StoreGateway {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// Number of chunks currently stored.
    pub async fn chunk_count(&self) -> Result<usize> {
        self.store.chunk_count().await.map_err(classify)
    }
}

#[async_trait]
impl DocumentStore for StoreGateway {
    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn add(&self, chunks: &[Chunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(classify)?;

        if embeddings.len() != chunks.len() {
            return Err(ContrailError::StoreUnavailable(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let stored: Vec<StoredChunk> = chunks
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| StoredChunk::new(chunk, embedding))
            .collect();

        let written = self.store.upsert_batch(&stored).await.map_err(classify)?;
        debug!("Stored {} chunks", written);
        Ok(())
    }

    #[instrument(skip(self, request), fields(query = %request.query))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>> {
        let filter = match request.filter_expression.as_deref().map(str::trim) {
            Some(expr) if !expr.is_empty() => Some(filter::parse(expr).map_err(classify)?),
            _ => None,
        };

        let query_embedding = self.embedder.embed(&request.query).await.map_err(classify)?;

        let results = self
            .store
            .search(
                &query_embedding,
                request.top_k,
                request.similarity_threshold,
                filter.as_ref(),
            )
            .await
            .map_err(classify)?;

        debug!("Search returned {} hits", results.len());

        Ok(results
            .into_iter()
            .map(|scored| SearchHit {
                chunk_index: scored.chunk.chunk_index,
                document: Document::new(scored.chunk.content, scored.chunk.metadata),
                score: scored.score,
            })
            .collect())
    }
}

/// Sort a failure into "could not reach the store" or "store refused the data".
fn classify(err: ContrailError) -> ContrailError {
    let classified = match err {
        e @ (ContrailError::StoreUnavailable(_) | ContrailError::StoreRejected(_)) => return e,
        ContrailError::InvalidFilter(msg) => {
            ContrailError::StoreRejected(format!("invalid filter: {}", msg))
        }
        ContrailError::Database(db_err) if is_unavailable(&db_err) => {
            ContrailError::StoreUnavailable(format!("database: {}", db_err))
        }
        ContrailError::Database(db_err) => {
            ContrailError::StoreRejected(format!("database: {}", db_err))
        }
        e @ (ContrailError::Embedding(_)
        | ContrailError::OpenAI(_)
        | ContrailError::Http(_)
        | ContrailError::Io(_)) => ContrailError::StoreUnavailable(e.to_string()),
        other => ContrailError::StoreRejected(other.to_string()),
    };
    warn!("{}", classified);
    classified
}

fn is_unavailable(err: &rusqlite::Error) -> bool {
    match err.sqlite_error_code() {
        Some(code) => matches!(
            code,
            ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::ReadOnly
                | ErrorCode::SystemIoFailure
                | ErrorCode::DiskFull
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::vector_store::test_support::metadata;
    use crate::vector_store::MemoryVectorStore;

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(ContrailError::Embedding("connection refused".to_string()))
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(ContrailError::Embedding("connection refused".to_string()))
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    fn gateway() -> StoreGateway {
        StoreGateway::new(
            Arc::new(MemoryVectorStore::new()),
            Arc::new(HashingEmbedder::new(256)),
        )
    }

    fn chunk(document_id: &str, airline: &str, rating: f64, text: &str) -> Chunk {
        Chunk::new(text.to_string(), metadata(document_id, airline, rating, "Economy Class"), 0)
    }

    #[test]
    fn test_request_defaults() {
        let request = SearchRequest::new("legroom");
        assert_eq!(request.top_k, 5);
        assert!((request.similarity_threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.filter_expression, None);
        assert_eq!(SearchRequest::new("x").with_filter("").filter_expression, None);
    }

    #[tokio::test]
    async fn test_threshold_controls_results() {
        let gateway = gateway();
        let text = "The crew on this flight were friendly and attentive throughout.";
        gateway.add(&[chunk("id-0", "Delta", 8.0, text)]).await.unwrap();

        let hits = gateway.search(&SearchRequest::new("friendly crew")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata().document_id, "id-0");
        assert_eq!(hits[0].document.content, text);
        assert!(hits[0].score > 0.3 && hits[0].score < 0.99, "score {}", hits[0].score);

        let strict = SearchRequest::new("friendly crew").with_similarity_threshold(0.99);
        assert!(gateway.search(&strict).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_expression_applied() {
        let gateway = gateway();
        let text = "Food was cold and the seat would not recline.";
        gateway
            .add(&[
                chunk("id-0", "Delta", 3.0, text),
                chunk("id-1", "United", 3.0, text),
            ])
            .await
            .unwrap();

        let request = SearchRequest::new(text).with_filter("airline_name == 'United'");
        let hits = gateway.search(&request).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata().airline_name, "United");
    }

    #[tokio::test]
    async fn test_bad_filter_is_rejected() {
        let gateway = gateway();
        let request = SearchRequest::new("anything").with_filter("price < 100");
        let err = gateway.search(&request).await.unwrap_err();
        assert!(matches!(err, ContrailError::StoreRejected(_)));
    }

    #[tokio::test]
    async fn test_unreachable_embedder_is_unavailable() {
        let gateway =
            StoreGateway::new(Arc::new(MemoryVectorStore::new()), Arc::new(FailingEmbedder));
        let err = gateway.add(&[chunk("id-0", "Delta", 5.0, "text")]).await.unwrap_err();
        assert!(matches!(err, ContrailError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_list() {
        let hits = gateway().search(&SearchRequest::new("anything")).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(gateway().chunk_count().await.unwrap(), 0);
    }
}
