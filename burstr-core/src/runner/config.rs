use std::collections::HashSet;
use std::time::Duration;

use super::error::{Error, Result};

pub const DEFAULT_TARGETS: &[&str] = &[
    "https://www.uutispuro.fi/fi",
    "https://www.google.fi",
    "https://portfolio.jelinden.fi",
    "https://jelinden.fi",
];

pub const DEFAULT_REQUESTS: u64 = 300;
pub const DEFAULT_LAUNCH_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(1);
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// URLs every worker visits once.
    pub targets: Vec<String>,

    /// Total number of workers to launch.
    pub requests: u64,

    /// Pause between worker launches. `None` (or zero) launches the whole burst at once.
    pub launch_delay: Option<Duration>,

    /// Per-request deadline covering connect, response head and body drain.
    pub timeout: Duration,

    /// Width of the trailing window the live rate is computed over.
    pub rate_window: Duration,

    /// How often the live rate is reported.
    pub report_interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.iter().map(|s| (*s).to_string()).collect(),
            requests: DEFAULT_REQUESTS,
            launch_delay: Some(DEFAULT_LAUNCH_DELAY),
            timeout: DEFAULT_TIMEOUT,
            rate_window: DEFAULT_RATE_WINDOW,
            report_interval: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(Error::NoTargets);
        }

        let mut seen = HashSet::with_capacity(self.targets.len());
        for target in &self.targets {
            validate_target(target)?;
            if !seen.insert(target.as_str()) {
                return Err(Error::DuplicateTarget(target.clone()));
            }
        }

        if self.requests == 0 {
            return Err(Error::InvalidRequests);
        }
        if self.timeout.is_zero() {
            return Err(Error::InvalidTimeout);
        }
        if self.rate_window.is_zero() {
            return Err(Error::InvalidRateWindow);
        }
        if self.report_interval.is_zero() {
            return Err(Error::InvalidReportInterval);
        }

        Ok(())
    }

    /// Launch delay with zero normalized to "no delay".
    #[must_use]
    pub fn effective_launch_delay(&self) -> Option<Duration> {
        self.launch_delay.filter(|d| !d.is_zero())
    }
}

fn validate_target(target: &str) -> Result<()> {
    let parsed = url::Url::parse(target).map_err(|err| Error::InvalidTarget {
        url: target.to_string(),
        reason: err.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::InvalidTarget {
            url: target.to_string(),
            reason: format!("unsupported scheme `{other}`"),
        }),
    }
}
