//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use serde::Deserialize;

/// Output format for the score report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print a failed run the way callers grep for it
pub fn print_problem(error: &anyhow::Error) {
    eprintln!("{} {:#}", "Problem:".red().bold(), error);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format an optional metric, `-` when the provider left it out
pub fn format_metric(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Color the score: zero means nothing was worth scoring
pub fn color_score(score: f64) -> String {
    let formatted = format!("{:.2}", score);
    if score > 0.0 {
        formatted.green().bold().to_string()
    } else {
        formatted.yellow().bold().to_string()
    }
}
