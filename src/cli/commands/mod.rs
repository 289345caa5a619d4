//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod ingest;
mod ping;
mod retrieve;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use ping::run_ping;
pub use retrieve::{run_retrieve, RetrieveOptions};
