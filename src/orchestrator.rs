//! Composition root for Contrail.
//!
//! Builds the embedder, vector store and chat models from settings and hands
//! out the ingestion, retrieval and answering components wired to them.

use crate::chunking::{ChunkingConfig, TokenChunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{create_embedder, Embedder};
use crate::error::Result;
use crate::ingest::Ingestor;
use crate::llm::{ChatModel, OpenAIChat};
use crate::rag::RagEngine;
use crate::retrieval::{QueryEnhancer, Retriever};
use crate::vector_store::{create_vector_store, StoreGateway, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// The wired-up Contrail pipeline.
pub struct Pipeline {
    settings: Settings,
    prompts: Prompts,
    gateway: Arc<StoreGateway>,
}

impl Pipeline {
    /// Build the pipeline described by `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        let embedder = create_embedder(&settings)?;
        let store = create_vector_store(&settings)?;

        debug!(
            "Pipeline using {} embeddings and {} store",
            settings.embedding.provider, settings.vector_store.provider
        );

        Ok(Self::with_components(settings, prompts, store, embedder))
    }

    /// Build a pipeline around existing components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            settings,
            prompts,
            gateway: Arc::new(StoreGateway::new(store, embedder)),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The document store that ingestion writes to and retrieval reads from.
    pub fn gateway(&self) -> Arc<StoreGateway> {
        self.gateway.clone()
    }

    pub fn ingestor(&self) -> Ingestor {
        let chunker = TokenChunker::new(ChunkingConfig::from(&self.settings.chunking));
        Ingestor::new(self.gateway.clone(), chunker)
            .with_batch_size(self.settings.ingest.batch_size)
    }

    /// Chat model used for answers and `ping`.
    pub fn chat_model(&self) -> Result<Arc<dyn ChatModel>> {
        let rag = &self.settings.rag;
        Ok(Arc::new(OpenAIChat::new(&rag.model, rag.temperature, &self.settings.openai)?))
    }

    /// Retriever with configured defaults. Smart mode adds a query enhancer.
    pub fn retriever(&self, smart: bool) -> Result<Retriever> {
        let retrieval = &self.settings.retrieval;
        let mut retriever = Retriever::new(self.gateway.clone())
            .with_top_k(retrieval.top_k)
            .with_similarity_threshold(retrieval.similarity_threshold);

        if smart {
            let model = OpenAIChat::new(&retrieval.enhancer_model, 0.0, &self.settings.openai)?;
            retriever =
                retriever.with_enhancer(QueryEnhancer::new(Arc::new(model), self.prompts.clone()));
        }

        Ok(retriever)
    }

    pub fn rag_engine(&self) -> Result<RagEngine> {
        Ok(RagEngine::new(self.retriever(false)?, self.chat_model()?)
            .with_prompts(self.prompts.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EmbeddingProvider, VectorStoreProvider};
    use crate::vector_store::{DocumentStore, SearchRequest};
    use std::io::Write;

    fn offline_settings(csv: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Hashing;
        settings.embedding.dimensions = 128;
        settings.vector_store.provider = VectorStoreProvider::Memory;
        settings.ingest.csv_path = csv.to_string_lossy().to_string();
        settings
    }

    #[tokio::test]
    async fn test_offline_pipeline_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", vec!["h"; 20].join(",")).unwrap();
        writeln!(
            file,
            "0,Air France,8,Lovely,,,Champagne in the lounge before boarding and a quiet cabin.,,,\
             Business Class,CDG-JFK,,,,,,,,,yes"
        )
        .unwrap();

        let settings = offline_settings(file.path());
        let pipeline = Pipeline::new(settings).unwrap();

        let report = pipeline
            .ingestor()
            .run(&pipeline.settings().csv_path(), None, |_| {})
            .await
            .unwrap();
        assert_eq!(report.documents, 1);

        let hits = pipeline
            .gateway()
            .search(&SearchRequest::new(
                "Lovely\n\nChampagne in the lounge before boarding and a quiet cabin.",
            ))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.metadata.airline_name, "Air France");
        assert!(hits[0].document.metadata.recommended);
    }

    #[test]
    fn test_retriever_uses_settings() {
        let mut settings = offline_settings(std::path::Path::new("unused.csv"));
        settings.retrieval.top_k = 9;
        settings.retrieval.similarity_threshold = 0.5;

        let retriever = Pipeline::new(settings).unwrap().retriever(false).unwrap();
        assert_eq!(retriever.top_k(), 9);
        assert!((retriever.similarity_threshold() - 0.5).abs() < f32::EPSILON);
    }
}
