//! HTTP Load Tester - Main CLI Application
//!
//! Runs a constant-VU load scenario against one URL and exits with 0 when
//! every threshold passed, 99 when one was breached, or the error's exit
//! code when the run could not be carried out.

use clap::Parser;
use http_load_tester::{
    app::App,
    cli::{supports_color, Cli},
    config::load_config,
    error::{AppError, ErrorReporter, Result},
    models::RunConfig,
    output::{OutputCoordinator, OutputFormatterFactory},
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("This is a bug; please report it with the command line that triggered it.");
        process::exit(100);
    }));

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version print to stdout and exit 0
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(1);
        }
    };

    if cli.get_help_topic().is_some() {
        println!("{}", cli.display_help());
        return;
    }

    let mut use_color = cli.use_colors();

    let result = match load_config(cli.clone()) {
        Ok(config) => {
            use_color = resolve_color(&cli, &config);
            colored::control::set_override(use_color);
            run_application(config, use_color).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            ErrorReporter::new(use_color, cli.verbose).report_error(&e);
            print_error_suggestions(&e);
            process::exit(e.exit_code());
        }
    }
}

/// Flags win; otherwise the configured preference applies when the terminal can show it
fn resolve_color(cli: &Cli, config: &RunConfig) -> bool {
    cli.color_override()
        .unwrap_or_else(|| config.enable_color && supports_color())
}

/// Run the scenario and return the process exit code
async fn run_application(config: RunConfig, use_color: bool) -> Result<i32> {
    let formatter = OutputFormatterFactory::create_formatter(config.output_format, use_color, config.verbose);
    let coordinator = OutputCoordinator::new(formatter);

    let app = App::new(config).await?;

    for warning in app.warnings() {
        eprintln!("{}", coordinator.display_warning(&warning.message)?);
    }

    let report = app.run().await?;

    println!("{}", coordinator.display_report(&report)?);

    if let Some(ref path) = app.config().summary_export {
        coordinator.export_summary(&report, path)?;
    }

    Ok(report.exit_code())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) | AppError::Parse(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - A target URL is required: --url or TARGET_URL");
            eprintln!("  - Durations look like 500ms, 30s, 1m or 1m30s");
            eprintln!("  - Thresholds look like http_req_duration=p(95)<150");
            eprintln!("  - Each threshold metric may only be declared once");
            eprintln!("  - Run with --help-topic config for the full reference");
        }
        AppError::Network(_) => {
            eprintln!();
            eprintln!("Network troubleshooting:");
            eprintln!("  - Check your internet connection");
            eprintln!("  - Verify firewall and proxy settings");
            eprintln!("  - Test the target URL manually");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("File help:");
            eprintln!("  - Check that the --summary-export directory exists and is writable");
        }
        AppError::TestExecution(_) => {
            eprintln!();
            eprintln!("Execution troubleshooting:");
            eprintln!("  - Reduce the VU count with --vus");
            eprintln!("  - Check system resources (open file limits, memory)");
        }
        _ => {}
    }
}
