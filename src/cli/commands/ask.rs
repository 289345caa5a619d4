//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{require_text, Output, ASK_USAGE};
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::{Context, Result};

/// Run the ask command.
pub async fn run_ask(question: &[String], settings: Settings) -> Result<()> {
    let question = require_text(question, "question", ASK_USAGE)?;

    preflight::check(Operation::Ask, &settings)
        .context("Cannot answer (run 'contrail doctor' for diagnostics)")?;

    let engine = Pipeline::new(settings)?.rag_engine()?;

    Output::kv("Question", &format!("\"{}\"", question));
    let spinner = Output::spinner("Searching reviews and generating an answer...");
    let result = engine.ask(&question).await;
    spinner.finish_and_clear();

    let response = result.context("Failed to generate answer")?;

    println!();
    Output::rule(60);
    println!("ANSWER:");
    Output::rule(60);
    println!("{}", response.format_for_display());
    Output::rule(60);
    Ok(())
}
