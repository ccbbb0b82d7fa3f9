//! Final run report

use crate::{
    stats::MetricSummary,
    threshold::ThresholdResult,
    utils::duration::serde_literal,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Aggregated metrics and threshold verdicts of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub target_url: String,
    pub vus: u32,
    /// Highest number of VUs observed running at the same time
    pub peak_vus: u32,
    #[serde(with = "serde_literal")]
    pub duration: Duration,
    #[serde(with = "serde_literal")]
    pub think_time: Duration,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "serde_literal")]
    pub elapsed: Duration,
    /// Run was stopped before its deadline
    pub interrupted: bool,
    /// In-flight requests dropped after the graceful stop period
    pub abandoned_requests: u64,
    pub metrics: MetricSummary,
    pub thresholds: Vec<ThresholdResult>,
    /// Every threshold held
    pub passed: bool,
}

impl RunReport {
    pub fn total_requests(&self) -> u64 {
        self.metrics.http_reqs.count
    }

    pub fn failed_requests(&self) -> u64 {
        self.metrics.http_req_failed.failed
    }

    pub fn failure_rate(&self) -> f64 {
        self.metrics.http_req_failed.rate
    }

    pub fn p95_ms(&self) -> f64 {
        self.metrics.http_req_duration.p95
    }

    /// Thresholds that did not hold
    pub fn failed_thresholds(&self) -> impl Iterator<Item = &ThresholdResult> {
        self.thresholds.iter().filter(|result| !result.passed)
    }

    /// Process exit code for this verdict
    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            crate::defaults::THRESHOLDS_FAILED_EXIT_CODE
        }
    }
}
