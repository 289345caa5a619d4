//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration and input are available before
//! starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{ContrailError, Result};
use crate::openai::check_api_key;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion needs the CSV and, with OpenAI embeddings, an API key.
    Ingest,
    /// Retrieval needs an API key for OpenAI embeddings or smart mode.
    Retrieve { smart: bool },
    /// Answering always calls the chat model.
    Ask,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest => {
            let csv_path = settings.csv_path();
            if !csv_path.exists() {
                return Err(ContrailError::InputMissing(format!(
                    "CSV file not found: {}",
                    csv_path.display()
                )));
            }
            if settings.uses_openai_embeddings() {
                check_api_key()?;
            }
        }
        Operation::Retrieve { smart } => {
            if smart || settings.uses_openai_embeddings() {
                check_api_key()?;
            }
        }
        Operation::Ask => {
            check_api_key()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingProvider;

    #[test]
    fn test_offline_retrieve_has_no_requirements() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Hashing;
        assert!(check(Operation::Retrieve { smart: false }, &settings).is_ok());
    }

    #[test]
    fn test_ingest_requires_csv() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::Hashing;
        settings.ingest.csv_path = "/nonexistent/airline_review.csv".to_string();

        let err = check(Operation::Ingest, &settings).unwrap_err();
        assert!(matches!(err, ContrailError::InputMissing(_)));
    }
}
