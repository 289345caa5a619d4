//! Configuration module for Contrail.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{EnhancerPrompts, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingProvider, EmbeddingSettings, GeneralSettings, IngestSettings,
    OpenAISettings, PromptSettings, RagSettings, RetrievalSettings, Settings,
    VectorStoreProvider, VectorStoreSettings,
};
