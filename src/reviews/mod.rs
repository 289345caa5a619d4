//! Airline review corpus: CSV parsing and projection into documents.
//!
//! The review file is read one line per record. Each data row is parsed
//! into fields, projected into a [`Document`] with a fixed metadata schema,
//! and rows that fail the schema preconditions are dropped without
//! interrupting the read.

mod csv;
mod document;

pub use csv::{parse_row, read_documents, ReviewReader, ReviewRow};
pub use document::{build_document, clean, parse_rating, parse_recommended, MIN_FIELDS};

use serde::{Deserialize, Serialize};

/// Typed metadata attached to every review document and every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewMetadata {
    /// Stable identifier derived from the source row: `id-<row_index>`.
    pub document_id: String,
    pub airline_name: String,
    /// Overall rating, `0.0` when missing or unparseable.
    pub overall_rating: f64,
    pub review_title: String,
    pub seat_type: String,
    pub route: String,
    pub recommended: bool,
}

impl ReviewMetadata {
    /// Build the document id for a zero-based data row index.
    pub fn document_id_for(row_index: usize) -> String {
        format!("id-{}", row_index)
    }
}

/// A review projected into searchable text plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Review body, prefixed by `title\n\n` when the title is present.
    pub content: String,
    pub metadata: ReviewMetadata,
}

impl Document {
    pub fn new(content: String, metadata: ReviewMetadata) -> Self {
        Self { content, metadata }
    }

    pub fn document_id(&self) -> &str {
        &self.metadata.document_id
    }
}
