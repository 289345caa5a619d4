//! RAG response generation.

use super::context::{format_context_for_prompt, format_sources_for_display};
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::retrieval::Retriever;
use crate::vector_store::SearchHit;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// RAG engine for question answering.
pub struct RagEngine {
    retriever: Retriever,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl RagEngine {
    pub fn new(retriever: Retriever, model: Arc<dyn ChatModel>) -> Self {
        Self {
            retriever,
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answer a question from the retrieved reviews.
    ///
    /// With nothing retrieved the model still gets the question, unaugmented.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let sources = self.retriever.retrieve(question).await?.hits;

        let user_prompt = if sources.is_empty() {
            debug!("No context found, sending the question as is");
            question.to_string()
        } else {
            let mut vars = HashMap::new();
            vars.insert("question".to_string(), question.to_string());
            vars.insert("context".to_string(), format_context_for_prompt(&sources));
            self.prompts.render_with_custom(&self.prompts.rag.user, &vars)
        };

        let answer = self
            .model
            .call(Some(&self.prompts.rag.system), &user_prompt)
            .await?;

        debug!("Generated response with {} sources", sources.len());

        Ok(RagResponse { answer, sources })
    }
}

/// A RAG response with answer and sources.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Reviews the answer was grounded in.
    pub sources: Vec<SearchHit>,
}

impl RagResponse {
    /// Format the response for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.answer.clone();

        if !self.sources.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            output.push_str(&format_sources_for_display(&self.sources));
        }

        output
    }
}
