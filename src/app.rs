//! Main application orchestration and execution

use crate::{
    client::{HttpClient, LoadClient},
    config::{display_config_summary, validate_config, ValidationLevel, ValidationWarning},
    error::Result,
    executor::{ScenarioRunner, ShutdownHandle},
    logging::{LogLevel, LoggerFactory, RunLogger},
    models::{RunConfig, RunReport},
    stats::MetricsEvaluator,
};
use std::sync::Arc;

/// Coordinates configuration, scenario execution and threshold evaluation
pub struct App {
    config: Arc<RunConfig>,
    logger: RunLogger,
    warnings: Vec<ValidationWarning>,
}

impl App {
    /// Validate the configuration and prepare the run
    pub async fn new(config: RunConfig) -> Result<Self> {
        let warnings = validate_config(&config)?;
        let logger = LoggerFactory::new(config.clone()).create_run_logger().await;

        if config.debug {
            logger
                .logger()
                .debug("Configuration loaded")
                .field("summary", display_config_summary(&config))
                .log()
                .await;
        }

        Ok(Self {
            config: Arc::new(config),
            logger,
            warnings,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Warnings worth showing to the user: everything in verbose mode, otherwise only real warnings
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationWarning> {
        let verbose = self.config.verbose || self.config.debug;
        self.warnings
            .iter()
            .filter(move |w| verbose || w.level >= ValidationLevel::Warning)
    }

    /// Run against the configured target, stopping early on Ctrl-C
    pub async fn run(&self) -> Result<RunReport> {
        let client: Arc<dyn HttpClient> = Arc::new(LoadClient::new(&self.config)?);
        let runner = self.runner(client)?;
        let handle = runner.shutdown_handle();

        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.shutdown();
            }
        });

        let result = self.execute(runner).await;
        ctrl_c.abort();
        result
    }

    /// Run with a caller-supplied client
    pub async fn run_with_client(&self, client: Arc<dyn HttpClient>) -> Result<RunReport> {
        let runner = self.runner(client)?;
        self.execute(runner).await
    }

    /// Run with a caller-supplied client, exposing the shutdown handle before the run starts
    pub async fn run_with_shutdown<F>(&self, client: Arc<dyn HttpClient>, on_start: F) -> Result<RunReport>
    where
        F: FnOnce(ShutdownHandle),
    {
        let runner = self.runner(client)?;
        on_start(runner.shutdown_handle());
        self.execute(runner).await
    }

    fn runner(&self, client: Arc<dyn HttpClient>) -> Result<ScenarioRunner> {
        Ok(ScenarioRunner::new(Arc::clone(&self.config), client)?.with_logger(self.logger.clone()))
    }

    async fn execute(&self, runner: ScenarioRunner) -> Result<RunReport> {
        let result = match runner.run().await {
            Ok(result) => result,
            Err(e) => {
                self.logger.log_error(&e, "Scenario failed").await;
                return Err(e);
            }
        };

        let evaluator = MetricsEvaluator::new(self.config.thresholds.clone());
        let report = evaluator.build_report(&self.config, &result);

        self.logger.log_run_complete(&report).await;
        if self.logger.would_log(LogLevel::Info) || !report.passed {
            self.logger.log_threshold_results(&report.thresholds).await;
        }

        Ok(report)
    }
}
