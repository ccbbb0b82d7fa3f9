//! Topic-based command-line help with examples and detailed guidance
//!
//! `--help` shows clap's generated summary; `--help-topic TOPIC` prints one
//! of the longer references below.

use crate::config::env::EnvManager;
use colored::*;

/// Help text generator for the CLI application
pub struct HelpSystem {
    platform: String,
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpSystem {
    /// Topics accepted by `--help-topic`
    pub const TOPICS: &'static [&'static str] = &[
        "thresholds",
        "config",
        "environment",
        "examples",
        "exit-codes",
        "output",
    ];

    pub fn new() -> Self {
        Self {
            platform: platform_name().to_string(),
        }
    }

    /// Display the main help message with all available options
    pub fn display_main_help(&self, use_colors: bool) -> String {
        [
            self.format_header(use_colors),
            self.format_usage_section(use_colors),
            self.format_options_section(use_colors),
            self.format_examples_section(use_colors),
            self.format_footer(use_colors),
        ]
        .join("\n")
    }

    /// Display help for one topic, `None` if the topic is unknown
    pub fn display_topic_help(&self, topic: &str, use_colors: bool) -> Option<String> {
        match topic.to_lowercase().as_str() {
            "thresholds" | "threshold" => Some(self.format_thresholds_help(use_colors)),
            "config" | "configuration" => Some(self.format_configuration_help(use_colors)),
            "env" | "environment" => Some(self.format_environment_help(use_colors)),
            "examples" => Some(self.format_examples_section(use_colors)),
            "exit-codes" | "exit" => Some(self.format_exit_codes_help(use_colors)),
            "output" | "formatting" => Some(self.format_output_help(use_colors)),
            _ => None,
        }
    }

    fn heading(&self, text: &str, use_colors: bool) -> String {
        if use_colors {
            text.bright_green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = "HTTP Load Tester";
        let subtitle = "Constant-VU load generation against a single URL with pass/fail thresholds";
        let version = crate::VERSION;

        if use_colors {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title.bright_cyan().bold(),
                subtitle.bright_blue(),
                version.green(),
                self.platform.yellow()
            )
        } else {
            format!(
                "{}\n{}\nVersion: {} | Platform: {}\n",
                title, subtitle, version, self.platform
            )
        }
    }

    fn format_usage_section(&self, use_colors: bool) -> String {
        let usage_patterns = [
            "hlt --url <URL> [OPTIONS]",
            "hlt --config <FILE> [OPTIONS]",
            "hlt --help-topic <TOPIC>",
        ];

        let mut usage = format!("{}\n", self.heading("USAGE:", use_colors));
        for pattern in usage_patterns {
            if use_colors {
                usage.push_str(&format!("  {}\n", pattern.bright_white()));
            } else {
                usage.push_str(&format!("  {}\n", pattern));
            }
        }

        usage
    }

    fn format_options_section(&self, use_colors: bool) -> String {
        let options = [
            OptionHelp {
                short: None,
                long: "url",
                value: "<URL>",
                description: "URL requested by every virtual user (required)",
                example: Some("--url https://test.example.com/"),
            },
            OptionHelp {
                short: Some("d"),
                long: "duration",
                value: "<DURATION>",
                description: "Total run duration (default 1m)",
                example: Some("--duration 1m30s"),
            },
            OptionHelp {
                short: Some("u"),
                long: "vus",
                value: "<NUMBER>",
                description: "Concurrent virtual users (default 1000)",
                example: Some("--vus 50"),
            },
            OptionHelp {
                short: None,
                long: "think-time",
                value: "<DURATION>",
                description: "Pause after each request (default 1s)",
                example: Some("--think-time 500ms"),
            },
            OptionHelp {
                short: None,
                long: "threshold",
                value: "<METRIC=EXPR>",
                description: "Pass/fail rule, repeatable; replaces the defaults",
                example: Some("--threshold 'http_req_duration=p(95)<150'"),
            },
            OptionHelp {
                short: Some("t"),
                long: "timeout",
                value: "<DURATION>",
                description: "Per-request timeout (default 60s)",
                example: Some("--timeout 5s"),
            },
            OptionHelp {
                short: None,
                long: "graceful-stop",
                value: "<DURATION>",
                description: "Wait for in-flight requests after the run (default 30s)",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "user-agent",
                value: "<STRING>",
                description: "User-Agent header sent with every request",
                example: None,
            },
            OptionHelp {
                short: Some("c"),
                long: "config",
                value: "<FILE>",
                description: "JSON scenario file",
                example: Some("--config scenario.json"),
            },
            OptionHelp {
                short: None,
                long: "summary-export",
                value: "<FILE>",
                description: "Also write the JSON report to a file",
                example: Some("--summary-export summary.json"),
            },
            OptionHelp {
                short: Some("o"),
                long: "output",
                value: "<text|json>",
                description: "Report format on stdout",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "no-color",
                value: "",
                description: "Disable colored output (--color forces it on)",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "verbose",
                value: "",
                description: "Progress logging and extra report rows",
                example: None,
            },
            OptionHelp {
                short: None,
                long: "debug",
                value: "",
                description: "Structured debug logging of every request on stderr",
                example: None,
            },
        ];

        let mut output = format!("{}\n", self.heading("OPTIONS:", use_colors));
        for option in options {
            output.push_str(&option.format(use_colors));
            output.push('\n');
        }

        output
    }

    fn format_examples_section(&self, use_colors: bool) -> String {
        let examples = [
            ExampleHelp {
                title: "Default scenario",
                command: "hlt --url https://test.example.com/",
                description: "1000 VUs for 1m with a 1s pause, p(95)<150 and rate<0.001 thresholds",
            },
            ExampleHelp {
                title: "Small smoke test",
                command: "hlt --url http://localhost:8080/health --vus 5 --duration 10s",
                description: "Check a local service before a full run",
            },
            ExampleHelp {
                title: "Custom thresholds",
                command: "hlt --url https://api.example.com --threshold 'http_req_duration=p(95)<300,p(99)<800' --threshold 'http_req_failed=rate<0.01'",
                description: "Relax the latency budget and allow 1% failures",
            },
            ExampleHelp {
                title: "CI pipeline",
                command: "hlt --config scenario.json --output json --summary-export summary.json --no-color",
                description: "Machine-readable report; exit code 99 fails the build on a breach",
            },
            ExampleHelp {
                title: "Debugging a failing target",
                command: "hlt --url https://api.example.com --vus 1 --duration 5s --debug",
                description: "Log every request outcome as JSON on stderr",
            },
        ];

        let mut output = format!("{}\n", self.heading("EXAMPLES:", use_colors));
        for example in examples {
            output.push_str(&example.format(use_colors));
            output.push('\n');
        }

        output
    }

    fn format_footer(&self, use_colors: bool) -> String {
        let mut footer = format!("{}\n", self.heading("ADDITIONAL HELP:", use_colors));

        let help_topics = [
            ("--help-topic thresholds", "Threshold syntax and supported metrics"),
            ("--help-topic config", "Configuration layering and the JSON scenario file"),
            ("--help-topic environment", "Environment variables and .env files"),
            ("--help-topic examples", "More usage examples"),
            ("--help-topic exit-codes", "Exit codes for scripting"),
            ("--help-topic output", "Report formats and metric meanings"),
        ];

        for (command, description) in help_topics {
            if use_colors {
                footer.push_str(&format!("  {}: {}\n", command.bright_yellow(), description.white()));
            } else {
                footer.push_str(&format!("  {}: {}\n", command, description));
            }
        }

        footer
    }

    fn format_thresholds_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.heading("THRESHOLDS REFERENCE:", use_colors));

        help.push_str("SYNTAX:\n");
        help.push_str("  METRIC=EXPR[,EXPR...]        one metric, one or more expressions\n");
        help.push_str("  EXPR is AGGREGATION OP VALUE, e.g. p(95)<150 or rate<0.001\n");
        help.push_str("  OP is one of <, <=, >, >=, ==, !=\n\n");

        help.push_str("METRICS:\n");
        help.push_str("  http_req_duration   trend, milliseconds: avg, min, med, max, p(N)\n");
        help.push_str("  http_req_failed     rate of failed requests, 0..1: rate\n");
        help.push_str("  http_reqs           counter of requests: count, rate (per second)\n");
        help.push_str("  iterations          counter of VU iterations: count, rate (per second)\n\n");

        help.push_str("RULES:\n");
        help.push_str("  - Comparisons are strict: p(95)<150 fails at exactly 150ms\n");
        help.push_str("  - Any --threshold flag replaces the default set entirely\n");
        help.push_str("  - Each metric may appear once; repeat expressions after a comma instead\n");
        help.push_str("  - A metric with no expressions is rejected\n");
        help.push_str("  - Failed requests count toward http_req_duration\n");
        help.push_str("  - With zero requests the failure rate is 0 and trend values are 0\n\n");

        help.push_str("DEFAULTS:\n");
        for (metric, expressions) in crate::defaults::DEFAULT_THRESHOLDS {
            help.push_str(&format!("  {}={}\n", metric, expressions.join(",")));
        }

        help
    }

    fn format_configuration_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.heading("CONFIGURATION REFERENCE:", use_colors));

        help.push_str("CONFIGURATION PRIORITY (highest to lowest):\n");
        help.push_str("1. Command-line arguments\n");
        help.push_str("2. --config JSON scenario file\n");
        help.push_str("3. Environment variables\n");
        help.push_str("4. .env file in the working directory\n");
        help.push_str("5. Default values\n\n");

        help.push_str("SCENARIO FILE:\n");
        help.push_str("  {\n");
        help.push_str("    \"url\": \"https://test.example.com/\",\n");
        help.push_str("    \"duration\": \"1m\",\n");
        help.push_str("    \"vus\": 1000,\n");
        help.push_str("    \"think_time\": \"1s\",\n");
        help.push_str("    \"timeout\": \"60s\",\n");
        help.push_str("    \"graceful_stop\": \"30s\",\n");
        help.push_str("    \"thresholds\": {\n");
        help.push_str("      \"http_req_failed\": [\"rate<0.001\"],\n");
        help.push_str("      \"http_req_duration\": [\"p(95)<150\"]\n");
        help.push_str("    }\n");
        help.push_str("  }\n");
        help.push_str("  Every field is optional; unknown fields are rejected.\n\n");

        help.push_str("PARAMETER LIMITS:\n");
        help.push_str(&format!("- VUs: 1-{}\n", crate::defaults::MAX_VUS));
        let max_duration = crate::utils::format_duration_literal(crate::defaults::MAX_DURATION);
        help.push_str(&format!("- Duration: greater than 0, at most {}\n", max_duration));
        help.push_str(&format!("- Think time: 0 up to {} (a pause past the deadline is cut short)\n", max_duration));
        help.push_str(&format!("- Timeout: greater than 0, at most {}\n", max_duration));
        help.push_str(&format!("- Graceful stop: at most {}\n", max_duration));
        help.push_str("- URL: http or https with a host\n\n");

        help.push_str(&format!("HOST CAPACITY ({}):\n", self.platform));
        help.push_str(&format!(
            "- {} CPU cores detected; more than {} VUs per core triggers a warning\n",
            num_cpus::get(),
            crate::config::validation::VUS_PER_CPU_WARNING
        ));

        help
    }

    fn format_environment_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.heading("ENVIRONMENT VARIABLES REFERENCE:", use_colors));

        help.push_str("LOADING ORDER:\n");
        help.push_str("1. A .env file in the working directory is loaded first\n");
        help.push_str("2. Variables already set in the shell take precedence over .env\n");
        help.push_str("3. The scenario file and CLI flags override both\n\n");

        help.push_str("SUPPORTED VARIABLES:\n");
        for (var_name, description, example) in EnvManager::get_supported_env_vars() {
            if use_colors {
                help.push_str(&format!("  {:<15} {}\n", var_name.bright_yellow().bold(), description));
            } else {
                help.push_str(&format!("  {:<15} {}\n", var_name, description));
            }
            help.push_str(&format!("  {:<15} Example: {}\n", "", example));
        }

        let problems = EnvManager::validate_current_env();
        if !problems.is_empty() {
            help.push_str("\nPROBLEMS IN THE CURRENT ENVIRONMENT:\n");
            for problem in problems {
                help.push_str(&format!("  {}\n", problem));
            }
        }

        help.push_str("\nEXAMPLE .env FILE:\n");
        help.push_str(&EnvManager::create_example_env_content());

        help
    }

    fn format_exit_codes_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.heading("EXIT CODES:", use_colors));

        let codes = [
            (0, "Run completed and every threshold passed"),
            (1, "Invalid configuration, flags or threshold expression"),
            (2, "Network setup error (HTTP client could not be built)"),
            (5, "File I/O error, e.g. --summary-export could not be written"),
            (6, "Scenario execution error"),
            (crate::defaults::THRESHOLDS_FAILED_EXIT_CODE, "Run completed but one or more thresholds failed"),
            (100, "Internal error"),
        ];

        for (code, description) in codes {
            help.push_str(&format!("  {:<4} {}\n", code, description));
        }

        help.push_str("\nFailed requests never abort a run; they are counted in http_req_failed.\n");
        help
    }

    fn format_output_help(&self, use_colors: bool) -> String {
        let mut help = format!("{}\n\n", self.heading("OUTPUT FORMATTING REFERENCE:", use_colors));

        help.push_str("OUTPUT MODES:\n");
        help.push_str("  text   human-readable summary, colored when the terminal supports it\n");
        help.push_str("  json   the full report as pretty-printed JSON\n\n");

        help.push_str("STREAMS:\n");
        help.push_str("  stdout carries only the report; logs and warnings go to stderr\n\n");

        help.push_str("LATENCY COLORS:\n");
        help.push_str("  green < 50ms, cyan < 150ms, yellow < 300ms, magenta < 1s, red above\n\n");

        help.push_str("STATISTICS REPORTED:\n");
        help.push_str("  http_req_duration   avg, min, med, max, p(90), p(95) (p(99) with --verbose)\n");
        help.push_str("  http_req_failed     failure rate and counts\n");
        help.push_str("  http_reqs           total requests and requests per second\n");
        help.push_str("  iterations          completed iterations and iterations per second\n");
        help.push_str("  vus_max             peak concurrent virtual users\n");
        help.push_str("  --verbose adds data_received, timeouts and status code counts\n");

        help
    }
}

/// Display name of the host operating system
fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "windows" => "Windows",
        "macos" => "macOS",
        "linux" => "Linux",
        other => other,
    }
}

/// One row of the options section
struct OptionHelp {
    short: Option<&'static str>,
    long: &'static str,
    value: &'static str,
    description: &'static str,
    example: Option<&'static str>,
}

impl OptionHelp {
    fn format(&self, use_colors: bool) -> String {
        let mut option_str = match self.short {
            Some(short) if use_colors => format!("  {}, ", format!("-{}", short).bright_cyan()),
            Some(short) => format!("  -{}, ", short),
            None => "      ".to_string(),
        };

        let long_with_value = if self.value.is_empty() {
            format!("--{}", self.long)
        } else {
            format!("--{} {}", self.long, self.value)
        };

        if use_colors {
            option_str.push_str(&format!("{:<30} {}", long_with_value.bright_cyan(), self.description.white()));
        } else {
            option_str.push_str(&format!("{:<30} {}", long_with_value, self.description));
        }

        if let Some(example) = self.example {
            if use_colors {
                option_str.push_str(&format!(
                    "\n{}{}",
                    " ".repeat(36),
                    format!("Example: {}", example).bright_blue().italic()
                ));
            } else {
                option_str.push_str(&format!("\n{}Example: {}", " ".repeat(36), example));
            }
        }

        option_str
    }
}

struct ExampleHelp {
    title: &'static str,
    command: &'static str,
    description: &'static str,
}

impl ExampleHelp {
    fn format(&self, use_colors: bool) -> String {
        if use_colors {
            format!(
                "  {}:\n    {}\n    {}\n",
                self.title.bright_yellow().bold(),
                self.command.bright_white(),
                self.description.bright_blue().italic()
            )
        } else {
            format!("  {}:\n    {}\n    {}\n", self.title, self.command, self.description)
        }
    }
}
