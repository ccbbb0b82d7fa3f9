//! Report rendering and export
//!
//! Text reports come in plain and colored flavors; JSON output serializes
//! the full `RunReport` and is also what `--summary-export` writes.

mod colored;
mod formatter;
mod json;

pub use self::colored::{ColorScheme, ColoredFormatter, PerformanceLevel};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
pub use json::JsonFormatter;

use crate::{
    error::{AppError, Result},
    models::RunReport,
    types::OutputFormat,
};
use std::path::Path;

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter for the requested format and color preference
    pub fn create_formatter(format: OutputFormat, enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        if format == OutputFormat::Json {
            return Box::new(JsonFormatter::new());
        }

        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..Default::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Renders the final report and writes the optional summary export
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    pub fn display_report(&self, report: &RunReport) -> Result<String> {
        self.formatter.format_report(report)
    }

    pub fn display_warning(&self, warning: &str) -> Result<String> {
        self.formatter.format_warning(warning)
    }

    /// Write the report as JSON to `path`
    pub fn export_summary(&self, report: &RunReport, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(path, json).map_err(|e| {
            AppError::io(format!("Failed to write summary to {}: {}", path.display(), e))
        })
    }
}
