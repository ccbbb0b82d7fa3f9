//! Run configuration data model and validation

use crate::{
    threshold::ThresholdSet,
    types::{AppError, OutputFormat, Result},
    utils::duration::{format_duration_literal, parse_duration_literal, serde_literal},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Configuration of a single load test run
///
/// Built once at startup by layering defaults, environment and CLI flags,
/// then shared read-only with every virtual user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Target URL requested by every iteration
    #[serde(default, rename = "url")]
    pub target_url: String,

    /// Total run duration
    #[serde(default = "default_duration", with = "serde_literal")]
    pub duration: Duration,

    /// Number of concurrent virtual users
    #[serde(default = "default_vus")]
    pub vus: u32,

    /// Pause after each request
    #[serde(default = "default_think_time", with = "serde_literal")]
    pub think_time: Duration,

    /// Per-request timeout; a timed out request is a failed outcome
    #[serde(default = "default_timeout", rename = "timeout", with = "serde_literal")]
    pub request_timeout: Duration,

    /// Grace period after the deadline for in-flight requests
    #[serde(default = "default_graceful_stop", with = "serde_literal")]
    pub graceful_stop: Duration,

    /// Pass/fail rules evaluated at the end of the run
    #[serde(default = "ThresholdSet::defaults")]
    pub thresholds: ThresholdSet,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Report rendering mode
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Optional path the JSON report is written to
    #[serde(default)]
    pub summary_export: Option<PathBuf>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            duration: default_duration(),
            vus: default_vus(),
            think_time: default_think_time(),
            request_timeout: default_timeout(),
            graceful_stop: default_graceful_stop(),
            thresholds: ThresholdSet::defaults(),
            user_agent: default_user_agent(),
            output_format: OutputFormat::default(),
            summary_export: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl RunConfig {
    /// Create a configuration for a target with default load settings
    pub fn new<S: Into<String>>(target_url: S) -> Self {
        Self {
            target_url: target_url.into(),
            ..Self::default()
        }
    }

    /// Parsed target URL
    pub fn target(&self) -> Result<Url> {
        let url = Url::parse(&self.target_url)
            .map_err(|e| AppError::config(format!("Invalid target URL '{}': {}", self.target_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "Target URL must use http or https: {}",
                self.target_url
            )));
        }
        if url.host_str().is_none() {
            return Err(AppError::config(format!("Target URL has no host: {}", self.target_url)));
        }

        Ok(url)
    }

    /// Validate the configuration and return the first error
    pub fn validate(&self) -> Result<()> {
        if self.target_url.trim().is_empty() {
            return Err(AppError::config("A target URL is required (use --url or TARGET_URL)"));
        }
        self.target()?;

        if self.vus == 0 {
            return Err(AppError::config("VU count must be greater than 0"));
        }
        if self.vus > crate::defaults::MAX_VUS {
            return Err(AppError::config(format!(
                "VU count cannot exceed {}",
                crate::defaults::MAX_VUS
            )));
        }

        if self.duration.is_zero() {
            return Err(AppError::config("Duration must be greater than 0"));
        }
        if self.request_timeout.is_zero() {
            return Err(AppError::config("Request timeout must be greater than 0"));
        }
        for (name, value) in [
            ("Duration", self.duration),
            ("Think time", self.think_time),
            ("Request timeout", self.request_timeout),
            ("Graceful stop", self.graceful_stop),
        ] {
            if value > crate::defaults::MAX_DURATION {
                return Err(AppError::config(format!(
                    "{} cannot exceed {}, got: {}",
                    name,
                    format_duration_literal(crate::defaults::MAX_DURATION),
                    format_duration_literal(value)
                )));
            }
        }
        if self.user_agent.trim().is_empty() {
            return Err(AppError::config("User agent cannot be empty"));
        }

        Ok(())
    }

    /// Merge settings from any key/value source using the environment variable names
    pub fn merge_from_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TARGET_URL") {
            self.target_url = url.trim().to_string();
        }

        if let Some(duration) = lookup("DURATION") {
            self.duration = parse_duration_literal(&duration)
                .map_err(|e| AppError::config(format!("Invalid DURATION value '{}': {}", duration, e)))?;
        }

        if let Some(vus) = lookup("VUS") {
            self.vus = vus.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid VUS value '{}': {}", vus, e)))?;
        }

        if let Some(think_time) = lookup("THINK_TIME") {
            self.think_time = parse_duration_literal(&think_time)
                .map_err(|e| AppError::config(format!("Invalid THINK_TIME value '{}': {}", think_time, e)))?;
        }

        if let Some(timeout) = lookup("TIMEOUT") {
            self.request_timeout = parse_duration_literal(&timeout)
                .map_err(|e| AppError::config(format!("Invalid TIMEOUT value '{}': {}", timeout, e)))?;
        }

        if let Some(graceful_stop) = lookup("GRACEFUL_STOP") {
            self.graceful_stop = parse_duration_literal(&graceful_stop)
                .map_err(|e| AppError::config(format!("Invalid GRACEFUL_STOP value '{}': {}", graceful_stop, e)))?;
        }

        if let Some(thresholds) = lookup("THRESHOLDS") {
            self.thresholds = ThresholdSet::parse_list(&thresholds)
                .map_err(|e| AppError::config(format!("Invalid THRESHOLDS value: {}", e)))?;
        }

        if let Some(enable_color) = lookup("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_duration() -> Duration {
    crate::defaults::DEFAULT_DURATION
}

fn default_vus() -> u32 {
    crate::defaults::DEFAULT_VUS
}

fn default_think_time() -> Duration {
    crate::defaults::DEFAULT_THINK_TIME
}

fn default_timeout() -> Duration {
    crate::defaults::DEFAULT_TIMEOUT
}

fn default_graceful_stop() -> Duration {
    crate::defaults::DEFAULT_GRACEFUL_STOP
}

fn default_user_agent() -> String {
    crate::defaults::DEFAULT_USER_AGENT.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_mirror_original_scenario() {
        let config = RunConfig::default();
        assert_eq!(config.duration, Duration::from_secs(60));
        assert_eq!(config.vus, 1000);
        assert_eq!(config.think_time, Duration::from_secs(1));
        assert_eq!(config.thresholds.len(), 2);
    }

    #[test]
    fn test_config_with_url_is_valid() {
        let config = RunConfig::new("https://example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_url_invalid() {
        let err = RunConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("target URL is required"));
    }

    #[test]
    fn test_invalid_url_format() {
        let config = RunConfig::new("not-a-url");
        assert!(config.validate().is_err());

        let config = RunConfig::new("ftp://example.com/file");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_vus_invalid() {
        let mut config = RunConfig::new("https://example.com");
        config.vus = 0;
        assert!(config.validate().is_err());

        config.vus = crate::defaults::MAX_VUS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_duration_invalid() {
        let mut config = RunConfig::new("https://example.com");
        config.duration = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_think_time_longer_than_duration_valid() {
        let mut config = RunConfig::new("https://example.com");
        config.duration = Duration::from_millis(500);
        config.think_time = Duration::from_secs(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_durations_beyond_limit_invalid() {
        let too_long = crate::defaults::MAX_DURATION + Duration::from_secs(1);

        let mut config = RunConfig::new("https://example.com");
        config.duration = too_long;
        assert!(config.validate().unwrap_err().to_string().contains("Duration cannot exceed"));

        let mut config = RunConfig::new("https://example.com");
        config.think_time = too_long;
        config.duration = crate::defaults::MAX_DURATION;
        assert!(config.validate().unwrap_err().to_string().contains("Think time cannot exceed"));

        let mut config = RunConfig::new("https://example.com");
        config.graceful_stop = too_long;
        assert!(config.validate().unwrap_err().to_string().contains("Graceful stop cannot exceed"));

        let mut config = RunConfig::new("https://example.com");
        config.request_timeout = too_long;
        assert!(config.validate().is_err());

        let mut config = RunConfig::new("https://example.com");
        config.duration = crate::defaults::MAX_DURATION;
        config.graceful_stop = crate::defaults::MAX_DURATION;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_from_lookup() {
        let mut config = RunConfig::default();
        config
            .merge_from_lookup(lookup_from(&[
                ("TARGET_URL", " http://localhost:8080/health "),
                ("DURATION", "1m30s"),
                ("VUS", "25"),
                ("THINK_TIME", "250ms"),
                ("THRESHOLDS", "http_req_duration=p(99)<300,avg<100"),
                ("ENABLE_COLOR", "false"),
            ]))
            .unwrap();

        assert_eq!(config.target_url, "http://localhost:8080/health");
        assert_eq!(config.duration, Duration::from_secs(90));
        assert_eq!(config.vus, 25);
        assert_eq!(config.think_time, Duration::from_millis(250));
        assert_eq!(config.thresholds.len(), 1);
        assert_eq!(config.thresholds.expression_count(), 2);
        assert!(!config.enable_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_from_lookup_rejects_bad_values() {
        let cases = [
            ("DURATION", "forever"),
            ("VUS", "many"),
            ("VUS", "-1"),
            ("THINK_TIME", "-1s"),
            ("THRESHOLDS", "http_req_duration=p(95)<150;http_req_duration=avg<10"),
            ("ENABLE_COLOR", "maybe"),
        ];

        for (key, value) in cases {
            let mut config = RunConfig::default();
            let result = config.merge_from_lookup(lookup_from(&[(key, value)]));
            assert!(result.is_err(), "{}={} should be rejected", key, value);
        }
    }

    #[test]
    fn test_deserialize_uses_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{"url": "https://example.com", "vus": 10}"#).unwrap();
        assert_eq!(config.vus, 10);
        assert_eq!(config.duration, Duration::from_secs(60));
        assert_eq!(config.thresholds, ThresholdSet::defaults());
    }
}
