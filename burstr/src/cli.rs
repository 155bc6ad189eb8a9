use clap::Parser;
use std::time::Duration;

use burstr_core::runner::{DEFAULT_REQUESTS, RunConfig};

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 3s, 500ms, 1m)".to_string());
    }
    humantime::parse_duration(s)
        .map_err(|err| format!("invalid duration '{s}' (expected e.g. 3s, 500ms, 1m): {err}"))
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Log the live rate and print one summary line per target.
    HumanReadable,
    /// Emit JSON rate and summary lines (NDJSON) to stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "burstr",
    author,
    version,
    about = "Fire a fixed burst of GET requests and report latency per URL",
    long_about = "burstr launches a fixed number of concurrent workers. Every worker issues one GET to each target URL, draining the response body, and records the elapsed time.\n\nWhile workers are in flight the requests/second rate over the trailing second is logged once per second. When all workers are done, min/max/average latency and success/failure counts are printed for each target.\n\nFailed requests (connect errors, timeouts, unreadable bodies) are counted and never retried.",
    after_help = "Examples:\n  burstr\n  burstr --target https://example.com --requests 50 --launch-delay 0s\n  burstr --target http://127.0.0.1:8080/health --timeout 10s --output json\n\nSet RUST_LOG=debug to log every request."
)]
pub struct Cli {
    /// Target URL to load (repeatable). Replaces the built-in target list.
    #[arg(long = "target", value_name = "URL")]
    pub targets: Vec<String>,

    /// Number of workers to launch; each worker requests every target once
    #[arg(long, default_value_t = DEFAULT_REQUESTS)]
    pub requests: u64,

    /// Delay between worker launches (e.g. 500ms). Use 0s to launch all workers at once
    #[arg(long, value_parser = parse_duration, default_value = "500ms")]
    pub launch_delay: Duration,

    /// Per-request timeout, covering connect and reading the whole body
    #[arg(long, value_parser = parse_duration, default_value = "3s")]
    pub timeout: Duration,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        let defaults = RunConfig::default();
        RunConfig {
            targets: if self.targets.is_empty() {
                defaults.targets
            } else {
                self.targets.clone()
            },
            requests: self.requests,
            launch_delay: Some(self.launch_delay),
            timeout: self.timeout,
            rate_window: defaults.rate_window,
            report_interval: defaults.report_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_common_units() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("3s"), Ok(Duration::from_secs(3)));
        assert_eq!(parse_duration("1m"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("0s"), Ok(Duration::ZERO));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
    }

    #[test]
    fn no_arguments_reproduce_built_in_defaults() {
        let cli = match Cli::try_parse_from(["burstr"]) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        assert!(matches!(cli.output, OutputFormat::HumanReadable));
        assert_eq!(cli.run_config(), RunConfig::default());
    }

    #[test]
    fn cli_parses_overrides() {
        let parsed = Cli::try_parse_from([
            "burstr",
            "--target",
            "http://a.test/",
            "--target",
            "http://b.test/",
            "--requests",
            "10",
            "--launch-delay",
            "0s",
            "--timeout",
            "10s",
            "--output",
            "json",
        ]);

        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        let cfg = cli.run_config();
        assert_eq!(cfg.targets, vec!["http://a.test/", "http://b.test/"]);
        assert_eq!(cfg.requests, 10);
        assert_eq!(cfg.effective_launch_delay(), None);
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert!(matches!(cli.output, OutputFormat::Json));
    }
}
