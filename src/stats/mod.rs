//! Metric aggregation and threshold evaluation for a finished run
//!
//! Percentiles use linear interpolation between closest ranks: for `n`
//! sorted samples the rank is `p / 100 * (n - 1)` and the value is
//! interpolated between the samples on either side of it. Aggregates over
//! zero samples are 0, and the failure rate of zero requests is 0.

use crate::{
    executor::ScenarioResult,
    models::{RequestOutcome, RunConfig, RunReport},
    threshold::{self, Aggregation, MetricName, ThresholdSet},
    types::OutcomeStatus,
    utils::comparison::sort_samples,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;


/// Latency distribution in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendStats {
    pub count: usize,
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
}

/// A monotonically increasing count with its per-second rate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterStats {
    pub count: u64,
    pub rate: f64,
}

/// Share of requests that failed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateStats {
    pub failed: u64,
    pub total: u64,
    pub rate: f64,
}

/// All metrics aggregated from a run's outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub http_reqs: CounterStats,
    pub http_req_failed: RateStats,
    pub http_req_duration: TrendStats,
    pub iterations: CounterStats,
    /// Requests that hit the request timeout
    pub timeouts: u64,
    /// Total response body bytes received
    pub data_received: u64,
    /// Response count per HTTP status code
    pub status_codes: BTreeMap<u16, u64>,
    /// Sorted request latencies, kept for arbitrary percentile thresholds
    #[serde(skip)]
    latencies_ms: Vec<f64>,
}

impl MetricSummary {
    /// Observed value of `aggregation` over `metric`
    ///
    /// Combinations rejected by `ThresholdSet` yield NaN, which fails every
    /// comparison except `!=`.
    pub fn value(&self, metric: MetricName, aggregation: Aggregation) -> f64 {
        match (metric, aggregation) {
            (MetricName::HttpReqFailed, Aggregation::Rate) => self.http_req_failed.rate,
            (MetricName::HttpReqDuration, Aggregation::Avg) => self.http_req_duration.avg,
            (MetricName::HttpReqDuration, Aggregation::Min) => self.http_req_duration.min,
            (MetricName::HttpReqDuration, Aggregation::Med) => self.http_req_duration.med,
            (MetricName::HttpReqDuration, Aggregation::Max) => self.http_req_duration.max,
            (MetricName::HttpReqDuration, Aggregation::Percentile(p)) => percentile(&self.latencies_ms, p),
            (MetricName::HttpReqs, Aggregation::Count) => self.http_reqs.count as f64,
            (MetricName::HttpReqs, Aggregation::Rate) => self.http_reqs.rate,
            (MetricName::Iterations, Aggregation::Count) => self.iterations.count as f64,
            (MetricName::Iterations, Aggregation::Rate) => self.iterations.rate,
            _ => f64::NAN,
        }
    }
}

/// Percentile of ascending-sorted samples by linear interpolation
pub fn percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let percentile = percentile.clamp(0.0, 100.0);
    let index = (percentile / 100.0) * (sorted_values.len() as f64 - 1.0);
    let lower_index = index.floor() as usize;
    let upper_index = index.ceil() as usize;

    if lower_index == upper_index {
        sorted_values[lower_index]
    } else {
        let lower_value = sorted_values[lower_index];
        let upper_value = sorted_values[upper_index];
        let weight = index - lower_index as f64;
        lower_value + weight * (upper_value - lower_value)
    }
}

/// failures / total, defined as 0 when nothing was requested
pub fn failure_rate(failed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        failed as f64 / total as f64
    }
}

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

impl TrendStats {
    /// Summarize ascending-sorted samples
    pub fn from_sorted(sorted: &[f64]) -> Self {
        if sorted.is_empty() {
            return Self::default();
        }

        let sum: f64 = sorted.iter().sum();
        Self {
            count: sorted.len(),
            avg: sum / sorted.len() as f64,
            min: sorted[0],
            med: percentile(sorted, 50.0),
            max: sorted[sorted.len() - 1],
            p90: percentile(sorted, 90.0),
            p95: percentile(sorted, 95.0),
            p99: percentile(sorted, 99.0),
        }
    }
}

/// Aggregates outcomes and checks them against the configured thresholds
#[derive(Debug, Clone)]
pub struct MetricsEvaluator {
    thresholds: ThresholdSet,
}

impl MetricsEvaluator {
    pub fn new(thresholds: ThresholdSet) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdSet {
        &self.thresholds
    }

    /// Aggregate outcomes into metric values
    pub fn summarize(outcomes: &[RequestOutcome], iterations: u64, elapsed: Duration) -> MetricSummary {
        let total = outcomes.len() as u64;
        let failed = outcomes.iter().filter(|o| !o.is_successful()).count() as u64;
        let timeouts = outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Timeout)
            .count() as u64;

        let mut status_codes = BTreeMap::new();
        for code in outcomes.iter().filter_map(|o| o.http_status) {
            *status_codes.entry(code).or_insert(0) += 1;
        }

        let mut latencies_ms: Vec<f64> = outcomes.iter().map(|o| o.latency_ms()).collect();
        sort_samples(&mut latencies_ms);

        MetricSummary {
            http_reqs: CounterStats {
                count: total,
                rate: per_second(total, elapsed),
            },
            http_req_failed: RateStats {
                failed,
                total,
                rate: failure_rate(failed, total),
            },
            http_req_duration: TrendStats::from_sorted(&latencies_ms),
            iterations: CounterStats {
                count: iterations,
                rate: per_second(iterations, elapsed),
            },
            timeouts,
            data_received: outcomes.iter().map(|o| o.bytes_received).sum(),
            status_codes,
            latencies_ms,
        }
    }

    /// Build the final report for a finished scenario
    pub fn build_report(&self, config: &RunConfig, result: &ScenarioResult) -> RunReport {
        let metrics = Self::summarize(&result.outcomes, result.iterations, result.elapsed);
        let thresholds = self.thresholds.evaluate(&metrics);
        let passed = threshold::all_passed(&thresholds);

        RunReport {
            target_url: config.target_url.clone(),
            vus: config.vus,
            peak_vus: result.peak_vus,
            duration: config.duration,
            think_time: config.think_time,
            started_at: result.started_at,
            finished_at: result.finished_at,
            elapsed: result.elapsed,
            interrupted: result.interrupted,
            abandoned_requests: result.abandoned_requests,
            metrics,
            thresholds,
            passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes_from(latencies_ms: &[u64]) -> Vec<RequestOutcome> {
        latencies_ms
            .iter()
            .map(|ms| RequestOutcome::success(0, 200, Duration::from_millis(*ms), 100))
            .collect()
    }

    #[test]
    fn test_percentile_of_ten_values() {
        let values: Vec<f64> = (1..=10).map(|v| (v * 10) as f64).collect();
        let p95 = percentile(&values, 95.0);
        assert!((p95 - 95.5).abs() < 1e-9);
        assert!(p95 >= values[8] && p95 <= values[9]);
    }

    #[test]
    fn test_percentile_edges() {
        assert_eq!(percentile(&[], 95.0), 0.0);
        assert_eq!(percentile(&[42.0], 95.0), 42.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 0.0), 1.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 100.0), 3.0);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 50.0), 2.0);
    }

    #[test]
    fn test_failure_rate() {
        assert_eq!(failure_rate(0, 0), 0.0);
        assert_eq!(failure_rate(1, 4), 0.25);
        assert_eq!(failure_rate(3, 3), 1.0);
    }

    #[test]
    fn test_summarize_counts_and_rates() {
        let mut outcomes = outcomes_from(&[10, 20, 30]);
        outcomes.push(RequestOutcome::failed(1, Some(503), Duration::from_millis(40), "HTTP 503"));
        outcomes.push(RequestOutcome::timeout(2, Duration::from_millis(50)));

        let summary = MetricsEvaluator::summarize(&outcomes, 5, Duration::from_secs(2));

        assert_eq!(summary.http_reqs.count, 5);
        assert!((summary.http_reqs.rate - 2.5).abs() < 1e-9);
        assert_eq!(summary.http_req_failed.failed, 2);
        assert!((summary.http_req_failed.rate - 0.4).abs() < 1e-9);
        assert_eq!(summary.timeouts, 1);
        assert_eq!(summary.data_received, 300);
        assert_eq!(summary.status_codes.get(&200), Some(&3));
        assert_eq!(summary.status_codes.get(&503), Some(&1));
        assert_eq!(summary.http_req_duration.min, 10.0);
        assert_eq!(summary.http_req_duration.max, 50.0);
        assert_eq!(summary.http_req_duration.med, 30.0);
        assert!((summary.http_req_duration.avg - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = MetricsEvaluator::summarize(&[], 0, Duration::ZERO);
        assert_eq!(summary.http_reqs.count, 0);
        assert_eq!(summary.http_reqs.rate, 0.0);
        assert_eq!(summary.http_req_failed.rate, 0.0);
        assert_eq!(summary.http_req_duration, TrendStats::default());
    }

    #[test]
    fn test_value_lookup() {
        let summary = MetricsEvaluator::summarize(&outcomes_from(&[10, 20, 30, 40]), 4, Duration::from_secs(1));

        assert_eq!(summary.value(MetricName::HttpReqs, Aggregation::Count), 4.0);
        assert_eq!(summary.value(MetricName::Iterations, Aggregation::Rate), 4.0);
        assert_eq!(summary.value(MetricName::HttpReqDuration, Aggregation::Max), 40.0);
        assert!((summary.value(MetricName::HttpReqDuration, Aggregation::Percentile(75.0)) - 32.5).abs() < 1e-9);
        assert!(summary.value(MetricName::HttpReqFailed, Aggregation::Avg).is_nan());
    }

    #[test]
    fn test_latencies_not_serialized() {
        let summary = MetricsEvaluator::summarize(&outcomes_from(&[10, 20]), 2, Duration::from_secs(1));
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("latencies_ms").is_none());
        assert_eq!(json["http_req_duration"]["count"], 2);
        assert_eq!(json["status_codes"]["200"], 2);
    }
}
