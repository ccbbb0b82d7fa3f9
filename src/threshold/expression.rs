//! Threshold expression parsing: `p(95)<150`, `rate<0.001`, `count>=100`

use crate::error::{AppError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Metrics that thresholds can be declared on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricName {
    /// Share of requests classified as failed
    #[serde(rename = "http_req_failed")]
    HttpReqFailed,
    /// Request latency in milliseconds
    #[serde(rename = "http_req_duration")]
    HttpReqDuration,
    /// Number of requests issued
    #[serde(rename = "http_reqs")]
    HttpReqs,
    /// Number of completed virtual user iterations
    #[serde(rename = "iterations")]
    Iterations,
}

/// How a metric is aggregated, which decides the aggregations it accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Rate,
    Trend,
    Counter,
}

impl MetricName {
    pub const ALL: [MetricName; 4] = [
        MetricName::HttpReqFailed,
        MetricName::HttpReqDuration,
        MetricName::HttpReqs,
        MetricName::Iterations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HttpReqFailed => "http_req_failed",
            Self::HttpReqDuration => "http_req_duration",
            Self::HttpReqs => "http_reqs",
            Self::Iterations => "iterations",
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Self::HttpReqFailed => MetricKind::Rate,
            Self::HttpReqDuration => MetricKind::Trend,
            Self::HttpReqs | Self::Iterations => MetricKind::Counter,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str() == name)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|m| m.as_str()).collect();
                AppError::config(format!(
                    "Unknown threshold metric '{}' (expected one of: {})",
                    name,
                    known.join(", ")
                ))
            })
    }
}

/// Aggregation applied to a metric before comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    Rate,
    Count,
    Avg,
    Min,
    Med,
    Max,
    /// Percentile in 0..=100
    Percentile(f64),
}

impl Aggregation {
    /// Whether this aggregation makes sense for the given metric kind
    pub fn applies_to(&self, kind: MetricKind) -> bool {
        match kind {
            MetricKind::Rate => matches!(self, Self::Rate),
            MetricKind::Counter => matches!(self, Self::Count | Self::Rate),
            MetricKind::Trend => matches!(
                self,
                Self::Avg | Self::Min | Self::Med | Self::Max | Self::Percentile(_)
            ),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rate => write!(f, "rate"),
            Self::Count => write!(f, "count"),
            Self::Avg => write!(f, "avg"),
            Self::Min => write!(f, "min"),
            Self::Med => write!(f, "med"),
            Self::Max => write!(f, "max"),
            Self::Percentile(p) => write!(f, "p({})", p),
        }
    }
}

/// Comparison operator of a threshold expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    fn parse(op: &str) -> Result<Self> {
        match op {
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "==" | "===" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            other => Err(AppError::parse(format!("Unknown comparison operator '{}'", other))),
        }
    }

    pub fn holds(&self, observed: f64, limit: f64) -> bool {
        match self {
            Self::Lt => observed < limit,
            Self::Le => observed <= limit,
            Self::Gt => observed > limit,
            Self::Ge => observed >= limit,
            Self::Eq => observed == limit,
            Self::Ne => observed != limit,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
        };
        f.write_str(op)
    }
}

/// A single parsed threshold expression such as `p(95)<150`
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdExpr {
    source: String,
    pub aggregation: Aggregation,
    pub comparison: Comparison,
    pub limit: f64,
}

fn expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(rate|count|avg|min|med|max|p\(\s*([0-9]+(?:\.[0-9]+)?)\s*\))\s*(===|==|!=|<=|>=|<|>)\s*(-?[0-9]+(?:\.[0-9]+)?)\s*$",
        )
        .expect("threshold expression pattern is valid")
    })
}

impl ThresholdExpr {
    /// The expression exactly as written in the configuration
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the expression against an observed aggregate value
    pub fn passes(&self, observed: f64) -> bool {
        self.comparison.holds(observed, self.limit)
    }
}

impl FromStr for ThresholdExpr {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let captures = expression_pattern().captures(s).ok_or_else(|| {
            AppError::parse(format!(
                "Invalid threshold expression '{}' (expected e.g. 'p(95)<150' or 'rate<0.01')",
                s.trim()
            ))
        })?;

        let aggregation = match &captures[1] {
            "rate" => Aggregation::Rate,
            "count" => Aggregation::Count,
            "avg" => Aggregation::Avg,
            "min" => Aggregation::Min,
            "med" => Aggregation::Med,
            "max" => Aggregation::Max,
            _ => {
                let percentile: f64 = captures[2].parse()?;
                if !(0.0..=100.0).contains(&percentile) {
                    return Err(AppError::parse(format!(
                        "Percentile in '{}' must be between 0 and 100",
                        s.trim()
                    )));
                }
                Aggregation::Percentile(percentile)
            }
        };

        let comparison = Comparison::parse(&captures[3])?;
        let limit: f64 = captures[4].parse()?;

        Ok(Self {
            source: s.trim().to_string(),
            aggregation,
            comparison,
            limit,
        })
    }
}

impl fmt::Display for ThresholdExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_percentile_expression() {
        let expr: ThresholdExpr = "p(95)<150".parse().unwrap();
        assert_eq!(expr.aggregation, Aggregation::Percentile(95.0));
        assert_eq!(expr.comparison, Comparison::Lt);
        assert_eq!(expr.limit, 150.0);
        assert_eq!(expr.source(), "p(95)<150");
    }

    #[test]
    fn test_parse_rate_expression() {
        let expr: ThresholdExpr = "rate<0.001".parse().unwrap();
        assert_eq!(expr.aggregation, Aggregation::Rate);
        assert_eq!(expr.limit, 0.001);
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_fractional_percentile() {
        let expr: ThresholdExpr = "  p( 99.9 ) <= 300 ".parse().unwrap();
        assert_eq!(expr.aggregation, Aggregation::Percentile(99.9));
        assert_eq!(expr.comparison, Comparison::Le);
        assert_eq!(expr.source(), "p( 99.9 ) <= 300");
    }

    #[test]
    fn test_parse_all_operators() {
        let cases = [
            ("avg<1", Comparison::Lt),
            ("avg<=1", Comparison::Le),
            ("avg>1", Comparison::Gt),
            ("avg>=1", Comparison::Ge),
            ("avg==1", Comparison::Eq),
            ("avg===1", Comparison::Eq),
            ("avg!=1", Comparison::Ne),
        ];
        for (input, expected) in cases {
            let expr: ThresholdExpr = input.parse().unwrap();
            assert_eq!(expr.comparison, expected, "operator of {}", input);
        }
    }

    #[test]
    fn test_parse_rejects_malformed_expressions() {
        for input in ["", "p95<150", "p(95)", "<150", "p(95)<<150", "rate < abc", "p(101)<5", "median<3"] {
            assert!(input.parse::<ThresholdExpr>().is_err(), "'{}' should not parse", input);
        }
    }

    #[test]
    fn test_strict_comparison_boundaries() {
        let rate: ThresholdExpr = "rate<0.001".parse().unwrap();
        assert!(rate.passes(0.0));
        assert!(rate.passes(0.000_999));
        assert!(!rate.passes(0.001));
        assert!(!rate.passes(0.5));

        let p95: ThresholdExpr = "p(95)<150".parse().unwrap();
        assert!(p95.passes(149.99));
        assert!(!p95.passes(150.0));
    }

    #[test]
    fn test_metric_name_parsing() {
        assert_eq!("http_req_failed".parse::<MetricName>().unwrap(), MetricName::HttpReqFailed);
        assert_eq!(" http_req_duration ".parse::<MetricName>().unwrap(), MetricName::HttpReqDuration);
        assert!("http_req_blocked".parse::<MetricName>().is_err());
    }

    #[test]
    fn test_aggregation_applicability() {
        assert!(Aggregation::Rate.applies_to(MetricKind::Rate));
        assert!(!Aggregation::Percentile(95.0).applies_to(MetricKind::Rate));
        assert!(Aggregation::Percentile(95.0).applies_to(MetricKind::Trend));
        assert!(!Aggregation::Rate.applies_to(MetricKind::Trend));
        assert!(Aggregation::Count.applies_to(MetricKind::Counter));
        assert!(Aggregation::Rate.applies_to(MetricKind::Counter));
    }
}
