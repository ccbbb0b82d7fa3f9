//! Structured logging for load test runs
//!
//! Entries carry JSON fields and a per-run session ID. Debug runs switch to
//! JSON lines so per-request records can be piped into other tools.
//! Every entry is written to stderr; stdout is reserved for the report.

use crate::error::AppError;
use crate::executor::ProgressSnapshot;
use crate::models::{RequestOutcome, RunConfig, RunReport};
use crate::threshold::ThresholdResult;
use crate::utils::duration::format_duration_literal;
use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Per-request detail
    Debug,
    /// Run lifecycle and progress
    Info,
    /// Breached thresholds and interrupted runs
    Warn,
    /// Errors that end the scenario
    Error,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn colorize(&self, text: &str) -> ColoredString {
        match self {
            LogLevel::Debug => text.cyan(),
            LogLevel::Info => text.green(),
            LogLevel::Warn => text.yellow(),
            LogLevel::Error => text.red().bold(),
        }
    }
}

/// One structured log record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that emitted the entry
    pub logger: String,
    /// Structured fields, ordered by key
    pub fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// One human-readable line per entry
    Console,
    /// JSON lines
    Json,
}

/// Leveled logger writing to stderr
#[derive(Debug, Clone)]
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    session_id: Arc<RwLock<Option<String>>>,
}

impl Logger {
    /// Create a logger at INFO level with console output
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a logger whose level and format follow the run configuration
    pub fn with_config(name: String, config: &RunConfig) -> Self {
        let min_level = if config.debug {
            LogLevel::Debug
        } else if config.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: config.enable_color,
            format: if config.debug { LogFormat::Json } else { LogFormat::Console },
            name,
            session_id: Arc::new(RwLock::new(None)),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    pub fn set_format(&mut self, format: LogFormat) {
        self.format = format;
    }

    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn set_session_id(&self, session_id: String) {
        *self.session_id.write().await = Some(session_id);
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        if let Some(session_id) = self.session_id.read().await.as_ref() {
            entry
                .fields
                .insert("session_id".to_string(), serde_json::Value::String(session_id.clone()));
        }

        let output = self.render(&entry);
        let _ = writeln!(io::stderr(), "{}", output);
    }

    fn render(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let padded = format!("{:>5}", level_str);
        let formatted_level = if self.use_color {
            entry.level.colorize(&padded).to_string()
        } else {
            padded
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        let visible: Vec<String> = entry
            .fields
            .iter()
            .filter(|(k, _)| k.as_str() != "session_id")
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        if !visible.is_empty() {
            output.push_str(&format!(" {{{}}}", visible.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!(
                "{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}",
                entry.message
            ),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add the fields describing one request outcome
    pub fn outcome(self, outcome: &RequestOutcome) -> Self {
        self.field("vu", outcome.vu)
            .field("status", outcome.status)
            .field("http_status", outcome.http_status)
            .field("latency_ms", outcome.latency_ms())
            .field("bytes", outcome.bytes_received)
            .field("error", outcome.error_message.as_deref())
    }

    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error_exit_code", error.exit_code())
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for run lifecycle events
#[derive(Debug, Clone)]
pub struct RunLogger {
    logger: Logger,
}

impl RunLogger {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            logger: Logger::with_config("RUN".to_string(), config),
        }
    }

    /// A logger that only emits errors
    pub fn quiet() -> Self {
        let mut logger = Logger::new("RUN".to_string());
        logger.set_level(LogLevel::Error);
        Self { logger }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn would_log(&self, level: LogLevel) -> bool {
        self.logger.would_log(level)
    }

    pub async fn log_run_start(&self, config: &RunConfig) {
        self.logger
            .info(&format!(
                "Starting {} VUs against {} for {}",
                config.vus,
                config.target_url,
                format_duration_literal(config.duration)
            ))
            .field("vus", config.vus)
            .field("url", &config.target_url)
            .field("duration", format_duration_literal(config.duration))
            .field("think_time", format_duration_literal(config.think_time))
            .field("timeout", format_duration_literal(config.request_timeout))
            .field("thresholds", config.thresholds.to_string())
            .log()
            .await;
    }

    /// Per-request detail, only built when debug output is enabled
    pub async fn log_outcome(&self, outcome: &RequestOutcome) {
        if !self.would_log(LogLevel::Debug) {
            return;
        }

        let message = match outcome.http_status {
            Some(code) => format!("GET -> {} in {:.1}ms", code, outcome.latency_ms()),
            None => format!("GET -> {} in {:.1}ms", outcome.status, outcome.latency_ms()),
        };
        self.logger.debug(&message).outcome(outcome).log().await;
    }

    pub async fn log_progress(&self, snapshot: &ProgressSnapshot) {
        self.logger
            .info(&format!(
                "{} active VUs, {} requests, {} failed, {} iterations",
                snapshot.active_vus, snapshot.requests, snapshot.failures, snapshot.iterations
            ))
            .field("elapsed_s", snapshot.elapsed.as_secs_f64())
            .field("active_vus", snapshot.active_vus)
            .field("peak_vus", snapshot.peak_vus)
            .field("requests", snapshot.requests)
            .field("failures", snapshot.failures)
            .field("iterations", snapshot.iterations)
            .log()
            .await;
    }

    pub async fn log_shutdown_requested(&self) {
        self.logger
            .warn("Interrupt received, stopping all virtual users")
            .log()
            .await;
    }

    pub async fn log_run_complete(&self, report: &RunReport) {
        let level = if report.interrupted { LogLevel::Warn } else { LogLevel::Info };
        self.logger
            .log(
                level,
                &format!(
                    "Run finished after {:.1}s: {} requests, {:.2}% failed",
                    report.elapsed.as_secs_f64(),
                    report.total_requests(),
                    report.failure_rate() * 100.0
                ),
            )
            .field("interrupted", report.interrupted)
            .field("requests", report.total_requests())
            .field("failed", report.failed_requests())
            .field("p95_ms", report.p95_ms())
            .field("peak_vus", report.peak_vus)
            .field("abandoned_requests", report.abandoned_requests)
            .log()
            .await;
    }

    pub async fn log_threshold_results(&self, results: &[ThresholdResult]) {
        for result in results {
            let level = if result.passed { LogLevel::Info } else { LogLevel::Warn };
            self.logger
                .log(
                    level,
                    &format!(
                        "Threshold {}: {} (observed {:.4})",
                        result.metric, result.expression, result.observed
                    ),
                )
                .field("metric", result.metric)
                .field("expression", &result.expression)
                .field("observed", result.observed)
                .field("passed", result.passed)
                .log()
                .await;
        }
    }

    pub async fn log_error(&self, error: &AppError, context: &str) {
        self.logger
            .error(&format!("{}: {}", context, error))
            .error_info(error)
            .log()
            .await;
    }
}

/// Creates loggers sharing one session ID
pub struct LoggerFactory {
    config: RunConfig,
    session_id: String,
}

impl LoggerFactory {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            session_id: Uuid::new_v4().to_string(),
        }
    }

    pub async fn create_run_logger(&self) -> RunLogger {
        let run_logger = RunLogger::new(&self.config);
        run_logger.logger.set_session_id(self.session_id.clone()).await;
        run_logger
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}
