//! Contrail CLI entry point.

use anyhow::Result;
use clap::Parser;
use contrail::cli::{self, commands, Cli, Commands, Output};
use contrail::config::Settings;
use contrail::error::ContrailError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = cli::usage_exit_code(&e);
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli).await {
        let code = e
            .downcast_ref::<ContrailError>()
            .map(ContrailError::exit_code)
            .unwrap_or(1);
        Output::error(&format!("{:#}", e));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // -v beats the configured level; RUST_LOG beats both
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("contrail={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Ingest { limit } => {
            commands::run_ingest(limit, settings).await?;
        }

        Commands::Retrieve {
            query,
            smart,
            json,
            top_k,
            threshold,
        } => {
            let options = commands::RetrieveOptions {
                smart: *smart,
                json: *json,
                top_k: *top_k,
                threshold: *threshold,
            };
            commands::run_retrieve(query, options, settings).await?;
        }

        Commands::Ask { question } => {
            commands::run_ask(question, settings).await?;
        }

        Commands::Ping => {
            commands::run_ping(settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &config_path, &settings)?;
        }
    }

    Ok(())
}
