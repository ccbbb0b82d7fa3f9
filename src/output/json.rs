//! Machine-readable JSON formatter

use super::formatter::OutputFormatter;
use crate::{error::Result, models::RunReport, threshold::ThresholdResult};
use serde_json::json;

/// Emits the report as pretty-printed JSON
///
/// The complete report is a single JSON document; the section methods return
/// the matching fragment on its own.
#[derive(Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_header(&self, report: &RunReport) -> Result<String> {
        let header = json!({
            "target_url": report.target_url,
            "vus": report.vus,
            "duration": crate::utils::format_duration_literal(report.duration),
            "think_time": crate::utils::format_duration_literal(report.think_time),
            "interrupted": report.interrupted,
        });
        Ok(serde_json::to_string_pretty(&header)?)
    }

    fn format_metrics(&self, report: &RunReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(&report.metrics)?)
    }

    fn format_threshold_results(&self, results: &[ThresholdResult]) -> Result<String> {
        Ok(serde_json::to_string_pretty(results)?)
    }

    fn format_verdict(&self, report: &RunReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(&json!({ "passed": report.passed }))?)
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(serde_json::to_string(&json!({ "warning": warning }))?)
    }

    fn format_report(&self, report: &RunReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
