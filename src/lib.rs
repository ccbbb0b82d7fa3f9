//! HTTP Load Tester
//!
//! A single-scenario load generation harness: a constant number of virtual
//! users repeatedly GET one URL with a fixed think-time for a fixed duration,
//! after which the collected outcomes are checked against pass/fail
//! thresholds on error rate and latency.

pub mod app;
pub mod cli;
pub mod config;
pub mod client;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod stats;
pub mod threshold;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{RunConfig, RequestOutcome, RunReport};
pub use executor::{ScenarioRunner, ScenarioResult, ShutdownHandle};
pub use client::{HttpClient, LoadClient};
pub use stats::{MetricsEvaluator, MetricSummary, TrendStats};
pub use threshold::{ThresholdSet, ThresholdExpr, MetricName};
pub use output::{OutputFormatter, OutputFormatterFactory};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version line with build details, shown by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    " for ",
    env!("TARGET_TRIPLE"),
    ")"
);

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_DURATION: Duration = Duration::from_secs(60);
    pub const DEFAULT_VUS: u32 = 1000;
    pub const DEFAULT_THINK_TIME: Duration = Duration::from_secs(1);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_GRACEFUL_STOP: Duration = Duration::from_secs(30);
    pub const DEFAULT_THRESHOLDS: &[(&str, &[&str])] = &[
        ("http_req_failed", &["rate<0.001"]),
        ("http_req_duration", &["p(95)<150"]),
    ];
    pub const DEFAULT_ENABLE_COLOR: bool = true;
    pub const DEFAULT_USER_AGENT: &str = concat!("http-load-tester/", env!("CARGO_PKG_VERSION"));

    pub const MAX_VUS: u32 = 100_000;
    /// Upper bound for every configured duration (one week)
    pub const MAX_DURATION: Duration = Duration::from_secs(7 * 24 * 60 * 60);
    pub const MAX_REDIRECTS: usize = 10;

    /// Exit code when the run completed but at least one threshold failed
    pub const THRESHOLDS_FAILED_EXIT_CODE: i32 = 99;
}
