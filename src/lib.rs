//! Contrail - question answering over airline passenger reviews
//!
//! Contrail ingests a CSV of airline reviews into a vector store and answers
//! questions about them with retrieval-augmented generation.
//!
//! # Overview
//!
//! - Parse review rows into documents with typed metadata
//! - Split documents into overlapping token windows and embed them
//! - Search the store by meaning, optionally with model-extracted filters
//! - Answer questions with the retrieved reviews as context
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `reviews` - CSV reading and document projection
//! - `chunking` - Token-window chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector store backends, filter expressions and the store gateway
//! - `ingest` - Batched ingestion
//! - `llm` - Chat model access
//! - `retrieval` - Basic and smart retrieval
//! - `rag` - Answer generation
//! - `orchestrator` - Component wiring
//!
//! # Example
//!
//! ```rust,no_run
//! use contrail::config::Settings;
//! use contrail::orchestrator::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let retrieval = pipeline.retriever(false)?.retrieve("comfortable seats in economy").await?;
//!     for hit in retrieval.hits {
//!         println!("{} ({:.2})", hit.document.metadata.airline_name, hit.score);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod retrieval;
pub mod reviews;
pub mod vector_store;

pub use error::{ContrailError, Result};
