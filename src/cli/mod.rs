//! CLI module for Contrail.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::error::{ContrailError, Result};
use clap::{Parser, Subcommand};

pub const INGEST_USAGE: &str = "contrail ingest [LIMIT]";
pub const RETRIEVE_USAGE: &str = "contrail retrieve [--smart] <QUERY>...";
pub const ASK_USAGE: &str = "contrail ask <QUESTION>...";

/// Contrail - question answering over airline passenger reviews
///
/// Loads a CSV of airline reviews into a vector store, searches it by
/// meaning, and answers questions grounded in the reviews it finds.
#[derive(Parser, Debug)]
#[command(name = "contrail")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load reviews from the CSV into the vector store
    Ingest {
        /// Stop after this many reviews
        #[arg(allow_negative_numbers = true)]
        limit: Vec<String>,
    },

    /// Search reviews by meaning
    Retrieve {
        /// Search query
        #[arg(allow_negative_numbers = true)]
        query: Vec<String>,

        /// Rewrite the query and extract airline/rating/seat filters with a model first
        #[arg(long)]
        smart: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of results
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, allow_negative_numbers = true)]
        threshold: Option<f32>,
    },

    /// Ask a question and get an answer grounded in the reviews
    Ask {
        /// The question to ask
        #[arg(allow_negative_numbers = true)]
        question: Vec<String>,
    },

    /// Check that the chat model answers
    Ping,

    /// Check configuration, input data and the vector store
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Join positional tokens with single spaces and trim the result.
pub fn join_args(tokens: &[String]) -> String {
    tokens.join(" ").trim().to_string()
}

/// Join positional tokens, rejecting an empty result.
pub fn require_text(tokens: &[String], what: &str, usage: &str) -> Result<String> {
    let text = join_args(tokens);
    if text.is_empty() {
        return Err(ContrailError::bad_argument(format!("Missing {}", what), usage));
    }
    Ok(text)
}

/// Parse the optional ingestion limit from the positional tokens.
pub fn parse_limit(tokens: &[String]) -> Result<Option<usize>> {
    match tokens {
        [] => Ok(None),
        [value] => value.trim().parse::<usize>().map(Some).map_err(|_| {
            ContrailError::bad_argument(
                format!("Invalid limit '{}': expected a whole number", value),
                INGEST_USAGE,
            )
        }),
        _ => Err(ContrailError::bad_argument(
            format!("Expected one limit, got {}", tokens.len()),
            INGEST_USAGE,
        )),
    }
}

/// Reject similarity thresholds outside `[0, 1]`.
pub fn check_threshold(threshold: Option<f32>) -> Result<Option<f32>> {
    match threshold {
        Some(t) if !(0.0..=1.0).contains(&t) => Err(ContrailError::bad_argument(
            format!("Invalid threshold '{}': expected a value between 0 and 1", t),
            RETRIEVE_USAGE,
        )),
        other => Ok(other),
    }
}

/// Exit status for a command line clap refused to parse.
///
/// Help and version output exit 0; every usage error exits 1.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}
