//! Layered configuration: defaults, .env, environment, scenario file, CLI flags

use crate::{
    cli::Cli,
    config::{env::EnvManager, file::ScenarioFile},
    error::{AppError, Result},
    models::RunConfig,
    threshold::ThresholdSet,
    utils::format_duration_literal,
};

/// Configuration parser that combines CLI arguments with the other sources
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration from the process environment
    pub fn parse(&self) -> Result<RunConfig> {
        EnvManager::load_env_file(self.cli.debug)?;
        self.parse_with_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration with environment values taken from `lookup`
    pub fn parse_with_lookup<F>(&self, lookup: F) -> Result<RunConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.cli.validate().map_err(AppError::config)?;

        let mut config = RunConfig::default();
        config.merge_from_lookup(lookup)?;

        if let Some(ref path) = self.cli.config {
            ScenarioFile::load(path)?.apply(&mut config);
            if self.cli.debug {
                eprintln!("Applied scenario file {}", path.display());
            }
        }

        self.apply_cli_overrides(&mut config)?;
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut RunConfig) -> Result<()> {
        let cli = &self.cli;

        if let Some(ref url) = cli.url {
            config.target_url = url.trim().to_string();
        }
        if let Some(duration) = cli.duration {
            config.duration = duration;
        }
        if let Some(vus) = cli.vus {
            config.vus = vus;
        }
        if let Some(think_time) = cli.think_time {
            config.think_time = think_time;
        }
        if let Some(timeout) = cli.timeout {
            config.request_timeout = timeout;
        }
        if let Some(graceful_stop) = cli.graceful_stop {
            config.graceful_stop = graceful_stop;
        }
        if let Some(ref user_agent) = cli.user_agent {
            config.user_agent = user_agent.clone();
        }

        // Repeated flags build one set so a metric given twice is caught
        if !cli.thresholds.is_empty() {
            let mut thresholds = ThresholdSet::new();
            for entry in &cli.thresholds {
                thresholds.insert_entry(entry)?;
            }
            config.thresholds = thresholds;
        }

        if let Some(format) = cli.output {
            config.output_format = format;
        }
        if let Some(ref path) = cli.summary_export {
            config.summary_export = Some(path.clone());
        }
        if let Some(enable_color) = cli.color_override() {
            config.enable_color = enable_color;
        }

        // CLI-only flags
        config.verbose = cli.verbose;
        config.debug = cli.debug;

        if config.debug {
            eprintln!("Applied CLI overrides to configuration");
        }

        Ok(())
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<RunConfig> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &RunConfig) -> String {
    let summary = [
        format!("Target URL: {}", config.target_url),
        format!("Duration: {}", format_duration_literal(config.duration)),
        format!("VUs: {}", config.vus),
        format!("Think Time: {}", format_duration_literal(config.think_time)),
        format!("Timeout: {}", format_duration_literal(config.request_timeout)),
        format!("Graceful Stop: {}", format_duration_literal(config.graceful_stop)),
        format!(
            "Thresholds: {} ({} expressions on {} metrics)",
            config.thresholds,
            config.thresholds.expression_count(),
            config.thresholds.len()
        ),
        format!("Output: {:?}", config.output_format),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ];

    summary.join("\n")
}
