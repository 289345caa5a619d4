//! Query-side retrieval: basic similarity search and smart mode.
//!
//! Smart mode runs the question through a [`QueryEnhancer`] first and
//! attaches the compiled metadata filter to the search.

mod enhancer;
mod filters;

pub use enhancer::{parse_enhancement, Enhancement, QueryEnhancer};
pub use filters::{compile_filter, QueryFilters};

use crate::error::Result;
use crate::vector_store::{
    DocumentStore, SearchHit, SearchRequest, DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// What a retrieval ran and what it found.
#[derive(Debug, Clone)]
pub struct Retrieval {
    pub request: SearchRequest,
    /// Present in smart mode.
    pub enhancement: Option<Enhancement>,
    pub hits: Vec<SearchHit>,
}

/// Runs searches against a [`DocumentStore`].
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    enhancer: Option<QueryEnhancer>,
    top_k: usize,
    similarity_threshold: f32,
}

impl Retriever {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            enhancer: None,
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Enable smart mode.
    pub fn with_enhancer(mut self, enhancer: QueryEnhancer) -> Self {
        self.enhancer = Some(enhancer);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    fn request(&self, query: &str) -> SearchRequest {
        SearchRequest::new(query)
            .with_top_k(self.top_k)
            .with_similarity_threshold(self.similarity_threshold)
    }

    /// Plain similarity search on the query as given.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<Retrieval> {
        let request = self.request(query);
        let hits = self.store.search(&request).await?;
        info!("Retrieved {} documents", hits.len());

        Ok(Retrieval {
            request,
            enhancement: None,
            hits,
        })
    }

    /// Rewrite the query and extract filters, then search. Falls back to a
    /// plain search when no enhancer is configured.
    #[instrument(skip(self))]
    pub async fn retrieve_smart(&self, query: &str) -> Result<Retrieval> {
        let Some(enhancer) = &self.enhancer else {
            return self.retrieve(query).await;
        };

        let enhancement = enhancer.enhance(query).await;
        let request = self
            .request(&enhancement.enhanced_query)
            .with_filter(compile_filter(&enhancement.filters));

        let hits = self.store.search(&request).await?;
        info!(
            "Retrieved {} documents (filter: {})",
            hits.len(),
            request.filter_expression.as_deref().unwrap_or("none")
        );

        Ok(Retrieval {
            request,
            enhancement: Some(enhancement),
            hits,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::CannedStore;
    use super::*;
    use crate::chunking::Chunk;
    use crate::config::Prompts;
    use crate::embedding::{Embedder, HashingEmbedder};
    use crate::llm::test_support::ScriptedChat;
    use crate::reviews::{Document, ReviewMetadata};
    use crate::vector_store::{cosine_similarity, MemoryVectorStore, StoreGateway};

    fn review(id: &str, airline: &str, text: &str) -> Document {
        Document::new(
            text.to_string(),
            ReviewMetadata {
                document_id: id.to_string(),
                airline_name: airline.to_string(),
                overall_rating: 6.0,
                review_title: String::new(),
                seat_type: "Economy Class".to_string(),
                route: "AMS-JFK".to_string(),
                recommended: true,
            },
        )
    }

    #[tokio::test]
    async fn test_basic_uses_defaults() {
        let store = Arc::new(CannedStore::default());
        let retriever = Retriever::new(store.clone());

        let result = retriever.retrieve("late departure").await.unwrap();
        assert!(result.hits.is_empty());

        let request = store.last_request().unwrap();
        assert_eq!(request.query, "late departure");
        assert_eq!(request.top_k, 5);
        assert!((request.similarity_threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.filter_expression, None);
    }

    #[tokio::test]
    async fn test_smart_attaches_compiled_filter() {
        let store = Arc::new(CannedStore::with_hits(vec![review("id-0", "United", "fine")]));
        let chat = ScriptedChat::replying(
            "ENHANCED: on-time performance\nAIRLINE: United\nMIN_RATING: 7.5\nSEAT_TYPE: NONE",
        );
        let retriever = Retriever::new(store.clone())
            .with_enhancer(QueryEnhancer::new(Arc::new(chat), Prompts::default()));

        let result = retriever.retrieve_smart("is united punctual").await.unwrap();
        assert_eq!(result.hits.len(), 1);

        let request = store.last_request().unwrap();
        assert_eq!(request.query, "on-time performance");
        assert_eq!(
            request.filter_expression.as_deref(),
            Some("airline_name == 'United' && overall_rating >= 7.5")
        );
    }

    #[tokio::test]
    async fn test_smart_fallback_searches_without_filter() {
        let store = Arc::new(CannedStore::default());
        let retriever = Retriever::new(store.clone())
            .with_enhancer(QueryEnhancer::new(
                Arc::new(ScriptedChat::failing()),
                Prompts::default(),
            ));

        let result = retriever.retrieve_smart("cramped seats").await.unwrap();
        let enhancement = result.enhancement.unwrap();
        assert_eq!(enhancement.enhanced_query, "cramped seats");
        assert!(enhancement.filters.is_empty());

        let request = store.last_request().unwrap();
        assert_eq!(request.query, "cramped seats");
        assert_eq!(request.filter_expression, None);
    }

    #[tokio::test]
    async fn test_threshold_alone_decides_the_hit() {
        let embedder = Arc::new(HashingEmbedder::new(256));
        let gateway = StoreGateway::new(Arc::new(MemoryVectorStore::new()), embedder.clone());
        let doc = review("id-0", "KLM", "Boarding was chaotic but the crew were lovely.");
        gateway
            .add(&[Chunk::new(doc.content.clone(), doc.metadata.clone(), 0)])
            .await
            .unwrap();
        let gateway = Arc::new(gateway);

        let query = "the crew were lovely";
        let similarity = cosine_similarity(
            &embedder.embed(&doc.content).await.unwrap(),
            &embedder.embed(query).await.unwrap(),
        );
        assert!(similarity > 0.3 && similarity < 0.99, "similarity {}", similarity);

        let found = Retriever::new(gateway.clone()).retrieve(query).await.unwrap();
        assert_eq!(found.hits.len(), 1);
        assert_eq!(found.hits[0].document.metadata.document_id, "id-0");
        assert!((found.hits[0].score - similarity).abs() < 1e-4);

        let strict = Retriever::new(gateway)
            .with_similarity_threshold(0.99)
            .retrieve(query)
            .await
            .unwrap();
        assert!(strict.hits.is_empty());
    }
}
