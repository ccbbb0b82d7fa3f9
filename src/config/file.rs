//! JSON scenario file loaded with `--config`

use crate::{
    error::{AppError, Result},
    models::RunConfig,
    threshold::ThresholdSet,
    utils::duration::serde_literal,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Scenario settings read from a JSON file
///
/// Every field is optional; only the fields present override the layers
/// below. Unknown fields are rejected so a typo never silently falls back
/// to a default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub url: Option<String>,
    #[serde(default, with = "serde_literal::option")]
    pub duration: Option<Duration>,
    pub vus: Option<u32>,
    #[serde(default, with = "serde_literal::option")]
    pub think_time: Option<Duration>,
    #[serde(default, with = "serde_literal::option")]
    pub timeout: Option<Duration>,
    #[serde(default, with = "serde_literal::option")]
    pub graceful_stop: Option<Duration>,
    pub thresholds: Option<ThresholdSet>,
    pub user_agent: Option<String>,
}

impl ScenarioFile {
    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("Failed to read scenario file {}: {}", path.display(), e))
        })?;
        Self::parse(&content).map_err(|e| {
            AppError::config(format!("Invalid scenario file {}: {}", path.display(), e))
        })
    }

    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| AppError::config(e.to_string()))
    }

    /// Overlay the fields present in the file onto a configuration
    pub fn apply(self, config: &mut RunConfig) {
        if let Some(url) = self.url {
            config.target_url = url.trim().to_string();
        }
        if let Some(duration) = self.duration {
            config.duration = duration;
        }
        if let Some(vus) = self.vus {
            config.vus = vus;
        }
        if let Some(think_time) = self.think_time {
            config.think_time = think_time;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout = timeout;
        }
        if let Some(graceful_stop) = self.graceful_stop {
            config.graceful_stop = graceful_stop;
        }
        if let Some(thresholds) = self.thresholds {
            config.thresholds = thresholds;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_full_scenario_file() {
        let file = ScenarioFile::parse(
            r#"{
                "url": "https://test.example.com/",
                "duration": "1m",
                "vus": 1000,
                "think_time": "1s",
                "timeout": "10s",
                "graceful_stop": "5s",
                "thresholds": {
                    "http_req_failed": ["rate<0.001"],
                    "http_req_duration": ["p(95)<150"]
                }
            }"#,
        )
        .unwrap();

        let mut config = RunConfig::default();
        file.apply(&mut config);

        assert_eq!(config.target_url, "https://test.example.com/");
        assert_eq!(config.duration, Duration::from_secs(60));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.graceful_stop, Duration::from_secs(5));
        assert_eq!(config.thresholds, ThresholdSet::defaults());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_values() {
        let mut config = RunConfig::new("https://example.com");
        config.vus = 5;

        ScenarioFile::parse(r#"{"duration": "30s"}"#).unwrap().apply(&mut config);

        assert_eq!(config.duration, Duration::from_secs(30));
        assert_eq!(config.vus, 5);
        assert_eq!(config.target_url, "https://example.com");
        assert_eq!(config.thresholds, ThresholdSet::defaults());
    }

    #[test]
    fn test_thresholds_replace_whole_set() {
        let mut config = RunConfig::new("https://example.com");
        ScenarioFile::parse(r#"{"thresholds": {"http_req_duration": "avg<50"}}"#)
            .unwrap()
            .apply(&mut config);

        assert_eq!(config.thresholds.len(), 1);
        assert!(config.thresholds.get(crate::threshold::MetricName::HttpReqFailed).is_none());
    }

    #[test]
    fn test_rejected_files() {
        let cases = [
            r#"{"vus": 10, "users": 5}"#,
            r#"{"duration": "forever"}"#,
            r#"{"vus": -1}"#,
            r#"{"thresholds": {"http_req_duration": []}}"#,
            r#"{"thresholds": {"http_req_duration": ["p(95)<150"], "http_req_duration": ["avg<10"]}}"#,
            r#"{"thresholds": {"unknown_metric": ["avg<10"]}}"#,
            "not json",
        ];

        for case in cases {
            assert!(ScenarioFile::parse(case).is_err(), "should reject {}", case);
        }
    }

    #[test]
    fn test_load_from_disk() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), r#"{"url": "http://localhost:8080", "vus": 3}"#).unwrap();

        let scenario = ScenarioFile::load(file.path()).unwrap();
        assert_eq!(scenario.vus, Some(3));
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = ScenarioFile::load(Path::new("/nonexistent/scenario.json")).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("scenario.json"));
    }
}
