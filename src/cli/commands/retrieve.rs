//! Retrieve command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{check_threshold, require_text, Output, RETRIEVE_USAGE};
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use crate::retrieval::{QueryFilters, Retrieval};
use crate::vector_store::SearchHit;
use anyhow::Result;
use serde::Serialize;
use tracing::warn;

/// Options for the retrieve command.
#[derive(Debug, Clone, Default)]
pub struct RetrieveOptions {
    pub smart: bool,
    pub json: bool,
    pub top_k: Option<usize>,
    pub threshold: Option<f32>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    enhanced_query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filters: Option<&'a QueryFilters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_expression: Option<&'a str>,
    top_k: usize,
    similarity_threshold: f32,
    hits: &'a [SearchHit],
}

/// Run the retrieve command.
pub async fn run_retrieve(
    query: &[String],
    options: RetrieveOptions,
    mut settings: Settings,
) -> Result<()> {
    let query = require_text(query, "query", RETRIEVE_USAGE)?;
    let threshold = check_threshold(options.threshold)?;
    preflight::check(Operation::Retrieve { smart: options.smart }, &settings)?;

    if let Some(top_k) = options.top_k {
        settings.retrieval.top_k = top_k;
    }
    if let Some(threshold) = threshold {
        settings.retrieval.similarity_threshold = threshold;
    }

    let pipeline = Pipeline::new(settings)?;
    let retriever = pipeline.retriever(options.smart)?;

    if !options.json {
        Output::header(if options.smart { "Smart retrieval" } else { "Retrieval" });
        Output::kv("Query", &format!("\"{}\"", query));
        Output::kv("Top K", &retriever.top_k().to_string());
        Output::kv("Similarity threshold", &retriever.similarity_threshold().to_string());
    }

    let spinner = (!options.json).then(|| Output::spinner("Searching..."));
    let outcome = if options.smart {
        retriever.retrieve_smart(&query).await
    } else {
        retriever.retrieve(&query).await
    };
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let retrieval = match outcome {
        Ok(retrieval) => retrieval,
        Err(e) => {
            warn!("Search failed: {}", e);
            if !options.json {
                Output::error(&format!("Search error: {}", e));
            }
            Retrieval {
                request: crate::vector_store::SearchRequest::new(query.as_str())
                    .with_top_k(retriever.top_k())
                    .with_similarity_threshold(retriever.similarity_threshold()),
                enhancement: None,
                hits: Vec::new(),
            }
        }
    };

    if options.json {
        print_json(&query, &retrieval)
    } else {
        print_results(&retrieval);
        Ok(())
    }
}

fn print_json(query: &str, retrieval: &Retrieval) -> Result<()> {
    let enhancement = retrieval.enhancement.as_ref();
    let output = JsonOutput {
        query,
        enhanced_query: enhancement.map(|e| e.enhanced_query.as_str()),
        filters: enhancement.map(|e| &e.filters).filter(|f| !f.is_empty()),
        filter_expression: retrieval.request.filter_expression.as_deref(),
        top_k: retrieval.request.top_k,
        similarity_threshold: retrieval.request.similarity_threshold,
        hits: &retrieval.hits,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_results(retrieval: &Retrieval) {
    if let Some(enhancement) = &retrieval.enhancement {
        Output::kv("Enhanced query", &format!("\"{}\"", enhancement.enhanced_query));
        Output::kv(
            "Filter",
            retrieval.request.filter_expression.as_deref().unwrap_or("none"),
        );
    }

    if retrieval.hits.is_empty() {
        Output::warning("No matching documents found.");
        return;
    }

    Output::success(&format!("Found {} matching documents", retrieval.hits.len()));
    println!();
    Output::rule(60);
    for (i, hit) in retrieval.hits.iter().enumerate() {
        Output::review_hit(i + 1, hit);
    }
    println!();
    Output::rule(60);
}
