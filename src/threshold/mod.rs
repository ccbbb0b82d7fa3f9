//! Pass/fail thresholds declared per metric and evaluated at run end

pub mod expression;

pub use expression::{Aggregation, Comparison, MetricKind, MetricName, ThresholdExpr};

use crate::{
    error::{AppError, Result},
    stats::MetricSummary,
};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// All expressions declared on one metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricThresholds {
    pub metric: MetricName,
    pub expressions: Vec<ThresholdExpr>,
}

/// Ordered set of thresholds with at most one entry per metric
///
/// Declaring the same metric twice, or a metric with no expressions, is a
/// configuration error rather than a silent overwrite or drop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdSet {
    entries: Vec<MetricThresholds>,
}

/// Verdict of one threshold expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdResult {
    pub metric: MetricName,
    pub expression: String,
    pub observed: f64,
    pub passed: bool,
}

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The thresholds applied when none are configured
    pub fn defaults() -> Self {
        let mut set = Self::new();
        for (metric, expressions) in crate::defaults::DEFAULT_THRESHOLDS {
            set.insert_raw(metric, expressions.iter().copied())
                .expect("built-in thresholds are valid");
        }
        set
    }

    /// Add a metric's expressions, rejecting duplicates and mismatched aggregations
    pub fn insert(&mut self, metric: MetricName, expressions: Vec<ThresholdExpr>) -> Result<()> {
        if self.get(metric).is_some() {
            return Err(AppError::config(format!(
                "Duplicate threshold key '{}': declare all of its expressions in one entry",
                metric
            )));
        }
        if expressions.is_empty() {
            return Err(AppError::config(format!(
                "Threshold key '{}' has no expressions",
                metric
            )));
        }
        for expr in &expressions {
            if !expr.aggregation.applies_to(metric.kind()) {
                return Err(AppError::config(format!(
                    "Threshold '{}' uses '{}', which does not apply to metric '{}'",
                    expr.source(),
                    expr.aggregation,
                    metric
                )));
            }
        }

        self.entries.push(MetricThresholds { metric, expressions });
        Ok(())
    }

    /// Parse and add a metric given as text with its expressions
    pub fn insert_raw<'a, I>(&mut self, metric: &str, expressions: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let metric: MetricName = metric.parse()?;
        let expressions = expressions
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ThresholdExpr>>>()?;
        self.insert(metric, expressions)
    }

    /// Parse one `metric=expr[,expr...]` entry as given to `--threshold`
    pub fn insert_entry(&mut self, entry: &str) -> Result<()> {
        let (metric, expressions) = entry.split_once('=').ok_or_else(|| {
            AppError::config(format!(
                "Invalid threshold '{}' (expected METRIC=EXPR, e.g. http_req_duration=p(95)<150)",
                entry
            ))
        })?;
        self.insert_raw(metric, expressions.split(','))
    }

    /// Parse a `;`-separated list of entries, as used by the THRESHOLDS variable
    pub fn parse_list(list: &str) -> Result<Self> {
        let mut set = Self::new();
        for entry in list.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            set.insert_entry(entry)?;
        }
        Ok(set)
    }

    pub fn get(&self, metric: MetricName) -> Option<&MetricThresholds> {
        self.entries.iter().find(|entry| entry.metric == metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricThresholds> {
        self.entries.iter()
    }

    /// Number of metrics with thresholds
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of expressions across all metrics
    pub fn expression_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.expressions.len()).sum()
    }

    /// Evaluate every expression against the aggregated metrics
    pub fn evaluate(&self, summary: &MetricSummary) -> Vec<ThresholdResult> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry.expressions.iter().map(move |expr| {
                    let observed = summary.value(entry.metric, expr.aggregation);
                    ThresholdResult {
                        metric: entry.metric,
                        expression: expr.source().to_string(),
                        observed,
                        passed: expr.passes(observed),
                    }
                })
            })
            .collect()
    }
}

impl fmt::Display for ThresholdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .entries
            .iter()
            .map(|entry| {
                let expressions: Vec<&str> = entry.expressions.iter().map(|e| e.source()).collect();
                format!("{}={}", entry.metric, expressions.join(","))
            })
            .collect();
        f.write_str(&rendered.join("; "))
    }
}

impl Serialize for ThresholdSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            let expressions: Vec<&str> = entry.expressions.iter().map(|e| e.source()).collect();
            map.serialize_entry(entry.metric.as_str(), &expressions)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ThresholdSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ThresholdSetVisitor;

        impl<'de> Visitor<'de> for ThresholdSetVisitor {
            type Value = ThresholdSet;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of metric names to lists of threshold expressions")
            }

            // Visit entries one by one so a repeated key is seen instead of overwritten
            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<ThresholdSet, A::Error> {
                let mut set = ThresholdSet::new();
                while let Some((metric, expressions)) = access.next_entry::<String, ExpressionList>()? {
                    set.insert_raw(&metric, expressions.0.iter().map(String::as_str))
                        .map_err(de::Error::custom)?;
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(ThresholdSetVisitor)
    }
}

/// Accepts either a single expression string or a list of them
struct ExpressionList(Vec<String>);

impl<'de> Deserialize<'de> for ExpressionList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
            Empty(()),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(expression) => ExpressionList(vec![expression]),
            OneOrMany::Many(expressions) => ExpressionList(expressions),
            OneOrMany::Empty(()) => ExpressionList(Vec::new()),
        })
    }
}

/// Whether every threshold verdict passed; vacuously true when there are none
pub fn all_passed(results: &[ThresholdResult]) -> bool {
    results.iter().all(|result| result.passed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::RequestOutcome, stats::MetricsEvaluator};
    use std::time::Duration;

    fn summary_with(latencies_ms: &[u64], failures: usize) -> MetricSummary {
        let mut outcomes: Vec<RequestOutcome> = latencies_ms
            .iter()
            .map(|ms| RequestOutcome::success(0, 200, Duration::from_millis(*ms), 0))
            .collect();
        for _ in 0..failures {
            outcomes.push(RequestOutcome::failed(0, Some(500), Duration::from_millis(5), "HTTP 500"));
        }
        MetricsEvaluator::summarize(&outcomes, outcomes.len() as u64, Duration::from_secs(1))
    }

    #[test]
    fn test_default_thresholds() {
        let set = ThresholdSet::defaults();
        assert_eq!(set.len(), 2);
        assert_eq!(set.expression_count(), 2);
        assert!(set.get(MetricName::HttpReqFailed).is_some());
        assert_eq!(
            set.get(MetricName::HttpReqDuration).unwrap().expressions[0].source(),
            "p(95)<150"
        );
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut set = ThresholdSet::new();
        set.insert_entry("http_req_duration=p(95)<150").unwrap();
        let err = set.insert_entry("http_req_duration=p(99)<300").unwrap_err();
        assert!(err.to_string().contains("Duplicate threshold key"));
        assert_eq!(set.expression_count(), 1);
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let mut set = ThresholdSet::new();
        assert!(set.insert_entry("http_req_duration=").is_err());
        assert!(set.insert_entry("http_req_duration= , ").is_err());
        assert!(set.is_empty());
    }

    #[test]
    fn test_mismatched_aggregation_is_rejected() {
        let mut set = ThresholdSet::new();
        assert!(set.insert_entry("http_req_failed=p(95)<150").is_err());
        assert!(set.insert_entry("http_req_duration=rate<0.1").is_err());
        assert!(set.insert_entry("http_reqs=count>10").is_ok());
    }

    #[test]
    fn test_parse_list_with_multiple_expressions() {
        let set = ThresholdSet::parse_list(
            "http_req_failed=rate<0.01; http_req_duration=p(95)<150,avg<100;",
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.expression_count(), 3);
        assert_eq!(set.to_string(), "http_req_failed=rate<0.01; http_req_duration=p(95)<150,avg<100");
    }

    #[test]
    fn test_deserialize_rejects_duplicate_json_keys() {
        let json = r#"{
            "http_req_failed": ["rate<0.001"],
            "http_req_duration": ["p(95)<150"],
            "http_req_duration": []
        }"#;
        let err = serde_json::from_str::<ThresholdSet>(json).unwrap_err();
        assert!(err.to_string().contains("Duplicate threshold key"));
    }

    #[test]
    fn test_deserialize_rejects_empty_entry() {
        let json = r#"{ "http_req_duration": null }"#;
        let err = serde_json::from_str::<ThresholdSet>(json).unwrap_err();
        assert!(err.to_string().contains("no expressions"));
    }

    #[test]
    fn test_deserialize_accepts_single_string() {
        let json = r#"{ "http_req_duration": "p(95)<150", "http_reqs": ["count>0", "rate>1"] }"#;
        let set: ThresholdSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.expression_count(), 3);

        let round_trip = serde_json::to_value(&set).unwrap();
        assert_eq!(round_trip["http_reqs"][1], "rate>1");
    }

    #[test]
    fn test_evaluate_passes_with_fast_successful_requests() {
        let summary = summary_with(&[10, 20, 30, 40, 50, 60, 70, 80, 90, 100], 0);
        let results = ThresholdSet::defaults().evaluate(&summary);

        assert_eq!(results.len(), 2);
        assert!(all_passed(&results));
        let p95 = results.iter().find(|r| r.metric == MetricName::HttpReqDuration).unwrap();
        assert!((p95.observed - 95.5).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_fails_on_error_rate() {
        let summary = summary_with(&[10; 99], 1);
        let results = ThresholdSet::defaults().evaluate(&summary);
        let failed = results.iter().find(|r| r.metric == MetricName::HttpReqFailed).unwrap();

        assert!(!failed.passed);
        assert!((failed.observed - 0.01).abs() < 1e-9);
        assert!(!all_passed(&results));
    }

    #[test]
    fn test_evaluate_zero_requests_passes_vacuously() {
        let summary = summary_with(&[], 0);
        let results = ThresholdSet::defaults().evaluate(&summary);
        assert!(all_passed(&results));
        assert!(results.iter().all(|r| r.observed == 0.0));
    }

    #[test]
    fn test_no_thresholds_is_a_pass() {
        assert!(all_passed(&[]));
    }
}
