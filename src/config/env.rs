//! Environment variable handling and .env file management

use crate::{
    error::{AppError, Result},
    threshold::ThresholdSet,
    utils::parse_duration_literal,
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    ///
    /// Values already present in the process environment are not overwritten.
    pub fn load_env_file(debug: bool) -> Result<()> {
        Self::load_env_file_from(Path::new(".env"), debug)
    }

    pub fn load_env_file_from(path: &Path, debug: bool) -> Result<()> {
        if path.exists() {
            dotenv::from_path(path)
                .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;

            if debug {
                eprintln!("Loaded configuration from {}", path.display());
            }
        } else if debug {
            eprintln!("No {} file found, using defaults and CLI arguments", path.display());
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        r#"# HTTP Load Tester Configuration
#
# Values set here act as defaults and are overridden by real environment
# variables, a --config scenario file and command-line flags.

# URL requested by every virtual user (required)
# TARGET_URL=https://test.example.com/health

# Run duration (e.g. 30s, 1m, 1m30s)
# DURATION=1m

# Number of concurrent virtual users
# VUS=1000

# Pause after each request
# THINK_TIME=1s

# Pass/fail rules: metric=expr[,expr] entries separated by ';'
# THRESHOLDS=http_req_failed=rate<0.001;http_req_duration=p(95)<150

# Per-request timeout
# TIMEOUT=60s

# Grace period for in-flight requests once the duration elapses
# GRACEFUL_STOP=30s

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example scenarios:
#
# Smoke test against a local service:
# TARGET_URL=http://localhost:8080/
# VUS=5
# DURATION=10s
#
# Strict latency budget:
# THRESHOLDS=http_req_failed=rate<0.01;http_req_duration=p(95)<100,p(99)<250
"#
        .to_string()
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "TARGET_URL" => {
                let url = url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid TARGET_URL '{}': {}", value, e)))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(AppError::config(format!("TARGET_URL must use http or https: {}", value)));
                }
            }
            "DURATION" | "THINK_TIME" | "TIMEOUT" | "GRACEFUL_STOP" => {
                let duration = parse_duration_literal(value)
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
                if duration.is_zero() && matches!(key, "DURATION" | "TIMEOUT") {
                    return Err(AppError::config(format!("{} must be greater than 0", key)));
                }
                if duration > crate::defaults::MAX_DURATION {
                    return Err(AppError::config(format!("{} is longer than the one-week limit: {}", key, value)));
                }
            }
            "VUS" => {
                let vus: u32 = value.trim().parse()
                    .map_err(|e| AppError::config(format!("Invalid VUS value '{}': {}", value, e)))?;
                if vus == 0 || vus > crate::defaults::MAX_VUS {
                    return Err(AppError::config(format!(
                        "VUS must be between 1 and {}, got: {}",
                        crate::defaults::MAX_VUS,
                        vus
                    )));
                }
            }
            "THRESHOLDS" => {
                ThresholdSet::parse_list(value)
                    .map_err(|e| AppError::config(format!("Invalid THRESHOLDS value: {}", e)))?;
            }
            "ENABLE_COLOR" => {
                value.trim().parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {
                // Unknown environment variable, ignore
            }
        }

        Ok(())
    }

    /// Get list of all supported environment variables with descriptions
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TARGET_URL", "URL requested by every virtual user", "https://test.example.com/"),
            ("DURATION", "Total run duration", "1m"),
            ("VUS", "Number of concurrent virtual users", "1000"),
            ("THINK_TIME", "Pause after each request", "1s"),
            ("THRESHOLDS", "';'-separated metric=expr[,expr] entries", "http_req_duration=p(95)<150"),
            ("TIMEOUT", "Per-request timeout", "60s"),
            ("GRACEFUL_STOP", "Grace period for in-flight requests", "30s"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value).err()
            })
            .map(|e| format!("Warning: {}", e))
            .collect()
    }
}
