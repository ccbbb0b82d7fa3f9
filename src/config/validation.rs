//! Configuration validation rules and non-fatal warnings

use crate::{error::Result, models::RunConfig, utils::format_duration_literal};

/// VUs per CPU core above which the load generator itself may become the bottleneck
pub const VUS_PER_CPU_WARNING: u32 = 500;

/// Configuration validator with advisory checks on top of `RunConfig::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration and collect warnings for suspicious settings
    pub fn validate_comprehensive(config: &RunConfig) -> Result<Vec<ValidationWarning>> {
        Self::validate_with_cpus(config, num_cpus::get())
    }

    /// Same as `validate_comprehensive` with an explicit core count
    pub fn validate_with_cpus(config: &RunConfig, cpus: usize) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::check_target(config)?);
        warnings.extend(Self::check_timing(config));
        warnings.extend(Self::check_load(config, cpus));
        warnings.extend(Self::check_thresholds(config));

        Ok(warnings)
    }

    fn check_target(config: &RunConfig) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();
        let url = config.target()?;

        if url.scheme() == "http" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Target '{}' uses plain HTTP; TLS costs are not measured", config.target_url),
            ));
        }

        if let Some(url::Host::Ipv4(ip)) = url.host() {
            if ip.is_loopback() {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Info,
                    format!("Target '{}' is on the loopback interface and shares CPU with the load generator", config.target_url),
                ));
            }
        }

        Ok(warnings)
    }

    fn check_timing(config: &RunConfig) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.request_timeout > config.duration {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Request timeout ({}) is longer than the run duration ({}); slow requests may only end at the graceful stop",
                    format_duration_literal(config.request_timeout),
                    format_duration_literal(config.duration)
                ),
            ));
        }

        if config.think_time > config.duration {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Think time ({}) is longer than the run duration ({}); each VU sends a single request",
                    format_duration_literal(config.think_time),
                    format_duration_literal(config.duration)
                ),
            ));
        }

        if config.think_time.is_zero() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Think time is 0; every VU sends requests back to back".to_string(),
            ));
        }

        if config.graceful_stop.is_zero() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "Graceful stop is 0; requests still in flight at the deadline are abandoned".to_string(),
            ));
        }

        warnings
    }

    fn check_load(config: &RunConfig, cpus: usize) -> Vec<ValidationWarning> {
        let cpus = cpus.max(1) as u64;
        let per_cpu = u64::from(config.vus).div_ceil(cpus);

        if per_cpu > u64::from(VUS_PER_CPU_WARNING) {
            vec![ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} VUs on {} CPU cores ({} per core) may saturate this host and inflate latencies",
                    config.vus, cpus, per_cpu
                ),
            )]
        } else {
            Vec::new()
        }
    }

    fn check_thresholds(config: &RunConfig) -> Vec<ValidationWarning> {
        if config.thresholds.is_empty() {
            vec![ValidationWarning::new(
                ValidationLevel::Info,
                "No thresholds configured; the run passes regardless of results".to_string(),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    pub fn format(&self) -> String {
        format!("[{}] {}", self.level.as_str(), self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &RunConfig) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ThresholdSet;
    use std::time::Duration;

    fn messages(warnings: &[ValidationWarning]) -> Vec<&str> {
        warnings.iter().map(|w| w.message.as_str()).collect()
    }

    #[test]
    fn test_clean_config_has_no_warnings() {
        let mut config = RunConfig::new("https://example.com/");
        config.vus = 10;

        let warnings = ConfigValidator::validate_with_cpus(&config, 4).unwrap();
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", messages(&warnings));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let config = RunConfig::new("not a url");
        let err = validate_config(&config).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_plain_http_warning() {
        let mut config = RunConfig::new("http://example.com/");
        config.vus = 1;

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Info);
        assert!(warnings[0].message.contains("plain HTTP"));
    }

    #[test]
    fn test_loopback_target_warning() {
        let mut config = RunConfig::new("https://127.0.0.1:8443/");
        config.vus = 1;

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert!(messages(&warnings).iter().any(|m| m.contains("loopback")));
    }

    #[test]
    fn test_timeout_longer_than_duration_warning() {
        let mut config = RunConfig::new("https://example.com/");
        config.vus = 1;
        config.duration = Duration::from_secs(10);
        config.request_timeout = Duration::from_secs(30);

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Warning);
        assert!(warnings[0].message.contains("30s"));
        assert!(warnings[0].message.contains("10s"));
    }

    #[test]
    fn test_think_time_longer_than_duration_warning() {
        let mut config = RunConfig::new("https://example.com/");
        config.vus = 1;
        config.duration = Duration::from_millis(500);
        config.request_timeout = Duration::from_millis(500);

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Warning);
        assert!(warnings[0].message.contains("Think time (1s)"));
        assert!(warnings[0].message.contains("500ms"));
    }

    #[test]
    fn test_zero_think_time_warning() {
        let mut config = RunConfig::new("https://example.com/");
        config.vus = 1;
        config.think_time = Duration::ZERO;

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert!(messages(&warnings).iter().any(|m| m.contains("back to back")));
    }

    #[test]
    fn test_high_vus_per_cpu_warning() {
        let config = RunConfig::new("https://example.com/");

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert!(messages(&warnings).iter().any(|m| m.contains("1000 VUs on 1 CPU cores")));

        let warnings = ConfigValidator::validate_with_cpus(&config, 2).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_empty_thresholds_info() {
        let mut config = RunConfig::new("https://example.com/");
        config.vus = 1;
        config.thresholds = ThresholdSet::new();

        let warnings = ConfigValidator::validate_with_cpus(&config, 1).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].format().starts_with("[INFO]"));
    }
}
