//! Ping command: a one-line round trip to the chat model.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Pipeline;
use anyhow::Result;

const PING_PROMPT: &str = "Who are you!";

/// Run the ping command.
pub async fn run_ping(settings: Settings) -> Result<()> {
    preflight::check(Operation::Ask, &settings)?;

    let model = Pipeline::new(settings)?.chat_model()?;
    let spinner = Output::spinner(&format!("Calling {}...", model.name()));
    let reply = model.call(None, PING_PROMPT).await;
    spinner.finish_and_clear();

    let reply = reply?;
    Output::success("Model is reachable");
    println!("LLM Response: {}", reply);
    Ok(())
}
