//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::{parse_limit, Output};
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::{Context, Result};

/// Run the ingest command.
pub async fn run_ingest(limit: &[String], settings: Settings) -> Result<()> {
    let limit = parse_limit(limit)?;
    preflight::check(Operation::Ingest, &settings)?;

    let pipeline = Pipeline::new(settings)?;
    let ingestor = pipeline.ingestor();
    let csv_path = pipeline.settings().csv_path();

    Output::header("Ingesting airline reviews");
    Output::kv("Source", &csv_path.display().to_string());
    if let Some(limit) = limit {
        Output::kv("Limit", &limit.to_string());
    }

    Output::info("Reading, splitting and storing reviews...");
    let pb = Output::progress_bar(0, "chunks stored");
    let result = ingestor
        .run(&csv_path, limit, |progress| {
            pb.set_length(progress.total as u64);
            pb.set_position(progress.written as u64);
            pb.set_message(format!("batch {} ({} chunks)", progress.batch, progress.size));
        })
        .await;
    pb.finish_and_clear();

    let report = result
        .context("Ingestion aborted; batches written before the failure remain in the store")?;

    Output::success(&format!(
        "Stored {} chunks from {} documents in {} batches ({:.1}s)",
        report.chunks,
        report.documents,
        report.batches,
        report.elapsed.as_secs_f64()
    ));
    Ok(())
}
