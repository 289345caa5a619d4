//! CLI output formatting utilities.

use crate::vector_store::SearchHit;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a horizontal rule.
    pub fn rule(width: usize) {
        println!("{}", style("=".repeat(width)).dim());
    }

    /// Print one retrieved review in full.
    pub fn review_hit(number: usize, hit: &SearchHit) {
        let meta = hit.metadata();

        println!(
            "\n{} {}",
            style(format!("Result #{}:", number)).bold(),
            style(format!("(score: {:.2})", hit.score)).dim()
        );
        println!("{}", style("-".repeat(40)).dim());
        println!("Airline: {}", meta.airline_name);
        println!("Rating: {:.1}/10", meta.overall_rating);
        println!("Seat Type: {}", or_unspecified(&meta.seat_type));
        println!("Route: {}", or_unspecified(&meta.route));
        println!("Recommended: {}", if meta.recommended { "Yes" } else { "No" });
        if !meta.review_title.is_empty() {
            println!("Title: \"{}\"", meta.review_title);
        }
        println!("\nFull Review Text:");
        println!("{}", hit.document.content);
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn or_unspecified(value: &str) -> &str {
    if value.is_empty() {
        "Not specified"
    } else {
        value
    }
}
