//! Doctor command - verify configuration, input data and the vector store.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::create_vector_store;
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Contrail Doctor");
    println!();

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_check = check_openai_api_key(settings.uses_openai_embeddings());
    api_check.print();
    checks.push(api_check);
    println!();

    println!("{}", style("Input").bold());
    let csv_check = check_csv(settings);
    csv_check.print();
    checks.push(csv_check);
    println!();

    println!("{}", style("Vector Store").bold());
    let store_check = check_store(settings).await;
    store_check.print();
    checks.push(store_check);
    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);
    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!("{} error(s) found.", errors));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Contrail is ready to use.");
    }

    Ok(())
}

/// Check the OpenAI API key. Missing is an error only when embeddings need it.
fn check_openai_api_key(required: bool) -> CheckResult {
    let missing = |message: &str| {
        let hint = "Set with: export OPENAI_API_KEY='sk-...'";
        if required {
            CheckResult::error("OPENAI_API_KEY", message, hint)
        } else {
            CheckResult::warning(
                "OPENAI_API_KEY",
                &format!("{} (needed by ask, ping and --smart)", message),
                hint,
            )
        }
    };

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if key.is_empty() => missing("empty"),
        Ok(key) if key.is_ascii() && key.len() > 11 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok("OPENAI_API_KEY", &format!("configured ({})", masked))
        }
        Ok(_) => CheckResult::warning(
            "OPENAI_API_KEY",
            "set but format looks unusual",
            "Expected format: sk-... (OpenAI API key)",
        ),
        Err(_) => missing("not set"),
    }
}

fn check_csv(settings: &Settings) -> CheckResult {
    let path = settings.csv_path();
    match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() => CheckResult::ok(
            "Review CSV",
            &format!("{} ({})", path.display(), format_size(meta.len())),
        ),
        _ => CheckResult::error(
            "Review CSV",
            &format!("{} not found", path.display()),
            "Set [ingest] csv_path in the config file",
        ),
    }
}

async fn check_store(settings: &Settings) -> CheckResult {
    let name = format!("Store ({})", settings.vector_store.provider);
    let store = match create_vector_store(settings) {
        Ok(store) => store,
        Err(e) => {
            return CheckResult::error(&name, &e.to_string(), "Check [vector_store] sqlite_path")
        }
    };

    match store.chunk_count().await {
        Ok(0) => {
            CheckResult::warning(&name, "reachable, empty", "Load reviews with: contrail ingest")
        }
        Ok(count) => CheckResult::ok(&name, &format!("reachable, {} chunks", count)),
        Err(e) => CheckResult::error(&name, &e.to_string(), "Check [vector_store] sqlite_path"),
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override them", config_path.display()),
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
