//! Command-line interface with a topic-based help system

pub mod help;

pub use help::HelpSystem;

use crate::types::OutputFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

/// HTTP Load Tester - constant-VU load generation against a single URL
///
/// Options left unset fall back to the config file, the environment and
/// finally the built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "hlt")]
#[command(version, long_version = crate::LONG_VERSION, about, long_about = None)]
pub struct Cli {
    /// Target URL requested by every virtual user
    #[arg(long)]
    pub url: Option<String>,

    /// Run duration (e.g. 1m, 30s, 1m30s)
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Number of concurrent virtual users
    #[arg(short = 'u', long)]
    pub vus: Option<u32>,

    /// Pause after each request (e.g. 1s, 500ms)
    #[arg(long, value_parser = parse_duration)]
    pub think_time: Option<Duration>,

    /// Threshold as METRIC=EXPR[,EXPR...] (repeatable, replaces the defaults)
    #[arg(long = "threshold", value_name = "METRIC=EXPR", action = ArgAction::Append)]
    pub thresholds: Vec<String>,

    /// Per-request timeout
    #[arg(short, long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Grace period for in-flight requests after the run ends
    #[arg(long, value_parser = parse_duration)]
    pub graceful_stop: Option<Duration>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// JSON scenario file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(long, value_name = "FILE")]
    pub summary_export: Option<PathBuf>,

    /// Report format on stdout
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Show help for a specific topic (thresholds, config, environment, examples, exit-codes, output)
    #[arg(long, value_name = "TOPIC")]
    pub help_topic: Option<String>,
}

impl Cli {
    /// Check for flag combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }
        if self.thresholds.iter().any(|t| t.trim().is_empty()) {
            return Err("--threshold cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn get_help_topic(&self) -> Option<&str> {
        self.help_topic.as_deref()
    }

    /// Explicit color choice from flags, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }

    /// Display help for the requested topic, or the main help
    pub fn display_help(&self) -> String {
        let help_system = HelpSystem::new();
        let use_colors = self.use_colors();

        match &self.help_topic {
            Some(topic) => help_system.display_topic_help(topic, use_colors).unwrap_or_else(|| {
                format!(
                    "Unknown help topic: '{}'\n\nAvailable topics: {}\n\n{}",
                    topic,
                    HelpSystem::TOPICS.join(", "),
                    help_system.display_main_help(use_colors)
                )
            }),
            None => help_system.display_main_help(use_colors),
        }
    }
}

/// Parse a duration literal for clap
fn parse_duration(s: &str) -> Result<Duration, String> {
    crate::utils::parse_duration_literal(s).map_err(|e| e.to_string())
}

/// Check if the terminal supports color output
pub fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}
