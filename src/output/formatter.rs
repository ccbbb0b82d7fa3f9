//! Core formatting traits and the plain text implementation

use crate::{
    error::{AppError, Result},
    models::RunReport,
    threshold::ThresholdResult,
    utils::duration::format_duration_literal,
};
use std::fmt::Write as _;

/// Renders a run report for the terminal or for machines
pub trait OutputFormatter {
    /// Scenario description shown above the metrics
    fn format_header(&self, report: &RunReport) -> Result<String>;

    /// Aggregated metric values
    fn format_metrics(&self, report: &RunReport) -> Result<String>;

    /// One line per threshold expression with its verdict
    fn format_threshold_results(&self, results: &[ThresholdResult]) -> Result<String>;

    /// Overall pass/fail line
    fn format_verdict(&self, report: &RunReport) -> Result<String>;

    /// Non-fatal configuration warning
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Complete report
    fn format_report(&self, report: &RunReport) -> Result<String> {
        let sections = [
            self.format_header(report)?,
            self.format_metrics(report)?,
            self.format_threshold_results(&report.thresholds)?,
            self.format_verdict(report)?,
        ];
        Ok(sections.join("\n\n"))
    }
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Show status codes, timeouts and transfer volume
    pub verbose_mode: bool,
    /// Width of the metric name column
    pub label_width: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            label_width: 20,
        }
    }
}

pub(crate) fn write_err(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

/// Human-readable duration from milliseconds
pub(crate) fn format_duration_ms(duration_ms: f64) -> String {
    if duration_ms < 1.0 {
        format!("{:.0}µs", duration_ms * 1000.0)
    } else if duration_ms < 1000.0 {
        format!("{:.2}ms", duration_ms)
    } else if duration_ms < 60000.0 {
        format!("{:.2}s", duration_ms / 1000.0)
    } else {
        let minutes = (duration_ms / 60000.0) as u32;
        let seconds = (duration_ms % 60000.0) / 1000.0;
        format!("{}m{:.1}s", minutes, seconds)
    }
}

/// Percentage from a 0..=1 rate
pub(crate) fn format_percentage(rate: f64) -> String {
    format!("{:.2}%", rate * 100.0)
}

pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let value = bytes as f64;
    if value >= MB {
        format!("{:.1} MB", value / MB)
    } else if value >= KB {
        format!("{:.1} kB", value / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Observed value of a threshold in the metric's own unit
pub(crate) fn format_observed(result: &ThresholdResult) -> String {
    use crate::threshold::MetricKind;

    match result.metric.kind() {
        MetricKind::Trend => format_duration_ms(result.observed),
        MetricKind::Rate => format!("{:.4}", result.observed),
        MetricKind::Counter => format!("{:.2}", result.observed),
    }
}

/// (label, value) rows describing the metrics of a report
pub(crate) fn metric_rows(report: &RunReport, verbose: bool) -> Vec<(String, String)> {
    let metrics = &report.metrics;
    let trend = &metrics.http_req_duration;

    let mut rows = vec![
        (
            "http_req_duration".to_string(),
            format!(
                "avg={} min={} med={} max={} p(90)={} p(95)={}",
                format_duration_ms(trend.avg),
                format_duration_ms(trend.min),
                format_duration_ms(trend.med),
                format_duration_ms(trend.max),
                format_duration_ms(trend.p90),
                format_duration_ms(trend.p95),
            ),
        ),
        (
            "http_req_failed".to_string(),
            format!(
                "{}  {} out of {}",
                format_percentage(metrics.http_req_failed.rate),
                metrics.http_req_failed.failed,
                metrics.http_req_failed.total
            ),
        ),
        (
            "http_reqs".to_string(),
            format!("{}  {:.2}/s", metrics.http_reqs.count, metrics.http_reqs.rate),
        ),
        (
            "iterations".to_string(),
            format!("{}  {:.2}/s", metrics.iterations.count, metrics.iterations.rate),
        ),
        (
            "vus_max".to_string(),
            format!("{}  max={}", report.peak_vus, report.vus),
        ),
    ];

    if verbose {
        rows.push(("p(99)".to_string(), format_duration_ms(trend.p99)));
        rows.push(("data_received".to_string(), format_bytes(metrics.data_received)));
        rows.push(("timeouts".to_string(), metrics.timeouts.to_string()));
        if !metrics.status_codes.is_empty() {
            let codes: Vec<String> = metrics
                .status_codes
                .iter()
                .map(|(code, count)| format!("{}={}", code, count))
                .collect();
            rows.push(("status_codes".to_string(), codes.join(" ")));
        }
        if report.abandoned_requests > 0 {
            rows.push(("abandoned_requests".to_string(), report.abandoned_requests.to_string()));
        }
    }

    rows
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    /// Pad a label with dots up to the label column width
    fn dotted(&self, label: &str) -> String {
        let dots = self.options.label_width.saturating_sub(label.len()).max(2);
        format!("{}{}:", label, ".".repeat(dots))
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, report: &RunReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "  scenario: {} VUs for {}, {} think time",
            report.vus,
            format_duration_literal(report.duration),
            format_duration_literal(report.think_time)
        ).map_err(write_err)?;
        write!(output, "  target:   GET {}", report.target_url).map_err(write_err)?;

        if report.interrupted {
            write!(output, "\n  note:     run interrupted after {}",
                format_duration_ms(report.elapsed.as_secs_f64() * 1000.0)
            ).map_err(write_err)?;
        }

        Ok(output)
    }

    fn format_metrics(&self, report: &RunReport) -> Result<String> {
        let rows: Vec<String> = metric_rows(report, self.options.verbose_mode)
            .into_iter()
            .map(|(label, value)| format!("  {} {}", self.dotted(&label), value))
            .collect();
        Ok(rows.join("\n"))
    }

    fn format_threshold_results(&self, results: &[ThresholdResult]) -> Result<String> {
        let mut output = String::from("  thresholds:");

        if results.is_empty() {
            output.push_str(" none");
            return Ok(output);
        }

        for result in results {
            let mark = if result.passed { "✓" } else { "✗" };
            write!(output, "\n    {} {}: {}  observed {}",
                mark, result.metric, result.expression, format_observed(result)
            ).map_err(write_err)?;
        }

        Ok(output)
    }

    fn format_verdict(&self, report: &RunReport) -> Result<String> {
        if report.passed {
            return Ok("RESULT: PASSED".to_string());
        }

        let failed = report.failed_thresholds().count();
        Ok(format!(
            "RESULT: FAILED ({} of {} thresholds breached)",
            failed,
            report.thresholds.len()
        ))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::test_support::report;

    #[test]
    fn test_duration_formatting() {
        assert_eq!(format_duration_ms(0.5), "500µs");
        assert_eq!(format_duration_ms(12.345), "12.35ms");
        assert_eq!(format_duration_ms(1500.0), "1.50s");
        assert_eq!(format_duration_ms(90000.0), "1m30.0s");
    }

    #[test]
    fn test_bytes_formatting() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 kB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_plain_report_passing() {
        let formatter = PlainFormatter::new(FormattingOptions {
            enable_color: false,
            ..Default::default()
        });
        let output = formatter.format_report(&report(200, 50)).unwrap();

        assert!(output.contains("scenario: 10 VUs for 5s, 1s think time"));
        assert!(output.contains("http_reqs"));
        assert!(output.contains("✓ http_req_failed: rate<0.001"));
        assert!(output.contains("✓ http_req_duration: p(95)<150"));
        assert!(output.ends_with("RESULT: PASSED"));
        assert!(!output.contains("status_codes"));
        assert!(!output.contains('\x1b'));
    }

    #[test]
    fn test_plain_report_failing() {
        let formatter = PlainFormatter::new(FormattingOptions::default());
        let output = formatter.format_report(&report(500, 50)).unwrap();

        assert!(output.contains("✗ http_req_failed: rate<0.001"));
        assert!(output.contains("100.00%  50 out of 50"));
        assert!(output.contains("RESULT: FAILED (1 of 2 thresholds breached)"));
    }

    #[test]
    fn test_verbose_adds_detail_rows() {
        let formatter = PlainFormatter::new(FormattingOptions {
            verbose_mode: true,
            ..Default::default()
        });
        let output = formatter.format_metrics(&report(200, 3)).unwrap();

        assert!(output.contains("status_codes"));
        assert!(output.contains("200=3"));
        assert!(output.contains("data_received"));
    }

    #[test]
    fn test_interrupted_note() {
        let mut interrupted = report(200, 5);
        interrupted.interrupted = true;

        let formatter = PlainFormatter::new(FormattingOptions::default());
        assert!(formatter.format_header(&interrupted).unwrap().contains("run interrupted"));
    }
}
