//! Colored formatter with terminal color support

use super::formatter::{
    format_duration_ms, format_observed, metric_rows, write_err, FormattingOptions, OutputFormatter,
};
use crate::{
    error::Result,
    models::RunReport,
    threshold::ThresholdResult,
    utils::duration::format_duration_literal,
};
use colored::*;
use std::fmt::Write as _;

/// Latency classification for color coding
#[derive(Debug, Clone, PartialEq)]
pub enum PerformanceLevel {
    Excellent,  // < 50ms
    Good,       // 50-150ms
    Fair,       // 150-300ms
    Poor,       // 300-1000ms
    VeryPoor,   // > 1000ms
}

impl PerformanceLevel {
    pub fn from_response_time(time_ms: f64) -> Self {
        if time_ms < 50.0 {
            Self::Excellent
        } else if time_ms < 150.0 {
            Self::Good
        } else if time_ms < 300.0 {
            Self::Fair
        } else if time_ms < 1000.0 {
            Self::Poor
        } else {
            Self::VeryPoor
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Excellent => Color::Green,
            Self::Good => Color::Cyan,
            Self::Fair => Color::Yellow,
            Self::Poor => Color::Magenta,
            Self::VeryPoor => Color::Red,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn dimmed(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.dimmed()
        } else {
            text.normal()
        }
    }

    fn duration_colored(&self, duration_ms: f64) -> ColoredString {
        let level = PerformanceLevel::from_response_time(duration_ms);
        self.colorize(&format_duration_ms(duration_ms), level.color())
    }

    /// Label padded with dimmed dots
    fn dotted(&self, label: &str) -> String {
        let dots = self.options.label_width.saturating_sub(label.len()).max(2);
        format!("{}{}", label, self.dimmed(&format!("{}:", ".".repeat(dots))))
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, report: &RunReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "  {} {} VUs for {}, {} think time",
            self.bold("scenario:"),
            self.colorize(&report.vus.to_string(), self.color_scheme.info),
            self.colorize(&format_duration_literal(report.duration), self.color_scheme.info),
            format_duration_literal(report.think_time)
        ).map_err(write_err)?;
        write!(output, "  {}   GET {}",
            self.bold("target:"),
            self.colorize(&report.target_url, self.color_scheme.header)
        ).map_err(write_err)?;

        if report.interrupted {
            write!(output, "\n  {}",
                self.colorize(
                    &format!("run interrupted after {}", format_duration_ms(report.elapsed.as_secs_f64() * 1000.0)),
                    self.color_scheme.warning
                )
            ).map_err(write_err)?;
        }

        Ok(output)
    }

    fn format_metrics(&self, report: &RunReport) -> Result<String> {
        let mut lines = Vec::new();

        for (label, value) in metric_rows(report, self.options.verbose_mode) {
            let value = match label.as_str() {
                "http_req_failed" if report.failed_requests() > 0 => {
                    self.colorize(&value, self.color_scheme.error).to_string()
                }
                "http_req_failed" => self.colorize(&value, self.color_scheme.success).to_string(),
                "p(99)" => self.duration_colored(report.metrics.http_req_duration.p99).to_string(),
                _ => value,
            };
            lines.push(format!("  {} {}", self.dotted(&label), value));
        }

        Ok(lines.join("\n"))
    }

    fn format_threshold_results(&self, results: &[ThresholdResult]) -> Result<String> {
        let mut output = format!("  {}", self.bold("thresholds:"));

        if results.is_empty() {
            write!(output, " {}", self.colorize("none", self.color_scheme.muted)).map_err(write_err)?;
            return Ok(output);
        }

        for result in results {
            let (mark, color) = if result.passed {
                ("✓", self.color_scheme.success)
            } else {
                ("✗", self.color_scheme.error)
            };
            write!(output, "\n    {} {}: {}  {}",
                self.colorize(mark, color),
                result.metric,
                self.colorize(&result.expression, color),
                self.dimmed(&format!("observed {}", format_observed(result)))
            ).map_err(write_err)?;
        }

        Ok(output)
    }

    fn format_verdict(&self, report: &RunReport) -> Result<String> {
        if report.passed {
            return Ok(format!("{}", self.colorize("RESULT: PASSED", self.color_scheme.success).bold()));
        }

        let failed = report.failed_thresholds().count();
        let verdict = format!(
            "RESULT: FAILED ({} of {} thresholds breached)",
            failed,
            report.thresholds.len()
        );
        Ok(format!("{}", self.colorize(&verdict, self.color_scheme.error).bold()))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.colorize("WARNING:", self.color_scheme.warning).bold(), warning))
    }
}

impl ColoredFormatter {
    /// Check if the terminal supports colors
    pub fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err()
            && std::env::var("TERM").map(|term| term != "dumb").unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::report;

    #[test]
    fn test_performance_levels() {
        assert_eq!(PerformanceLevel::from_response_time(10.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_response_time(149.9), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_response_time(150.0), PerformanceLevel::Fair);
        assert_eq!(PerformanceLevel::from_response_time(5000.0), PerformanceLevel::VeryPoor);
    }

    #[test]
    fn test_colored_report_content() {
        let formatter = ColoredFormatter::new(FormattingOptions::default());
        let output = formatter.format_report(&report(500, 10)).unwrap();

        assert!(output.contains("http_req_failed"));
        assert!(output.contains("rate<0.001"));
        assert!(output.contains("RESULT: FAILED"));
    }

    #[test]
    fn test_colors_disabled_matches_plain_text() {
        let formatter = ColoredFormatter::new(FormattingOptions {
            enable_color: false,
            ..Default::default()
        });
        let verdict = formatter.format_verdict(&report(200, 10)).unwrap();
        assert!(verdict.contains("RESULT: PASSED"));

        let warning = formatter.format_warning("plain HTTP target").unwrap();
        assert!(warning.contains("WARNING:"));
        assert!(warning.ends_with("plain HTTP target"));
    }
}
