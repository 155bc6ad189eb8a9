use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;

/// One URL under load together with everything observed for it so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Target {
    pub url: String,
    /// Latency of every successful attempt, in seconds, in recording order.
    pub latencies: Vec<f64>,
    pub successes: u64,
    pub failures: u64,
}

impl Target {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.successes.saturating_add(self.failures)
    }

    #[must_use]
    pub fn summarize(&self) -> TargetSummary {
        let (min, max, avg) = min_max_avg(&self.latencies);
        TargetSummary {
            url: self.url.clone(),
            requests: self.successes,
            failed: self.failures,
            min,
            max,
            avg,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetSummary {
    pub url: String,
    /// Successful attempts.
    pub requests: u64,
    pub failed: u64,
    pub min: f64,
    pub max: f64,
    /// `NaN` when no attempt succeeded.
    pub avg: f64,
}

impl TargetSummary {
    #[must_use]
    pub fn has_samples(&self) -> bool {
        !self.avg.is_nan()
    }
}

impl fmt::Display for TargetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests: {}, failed: {}, min: {:.3}s, max: {:.3}s, avg: {:.3}s",
            self.url, self.requests, self.failed, self.min, self.max, self.avg
        )
    }
}

/// Returns `(min, max, avg)` of `latencies`.
///
/// An empty slice yields `min = max = 0.0` and `avg = NaN` (0 / 0).
#[must_use]
pub fn min_max_avg(latencies: &[f64]) -> (f64, f64, f64) {
    // `None` is the unset sentinel: the first sample always becomes both min and max.
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;
    let mut sum = 0.0;

    for &t in latencies {
        if min.is_none_or(|m| t < m) {
            min = Some(t);
        }
        if max.is_none_or(|m| t > m) {
            max = Some(t);
        }
        sum += t;
    }

    (
        min.unwrap_or(0.0),
        max.unwrap_or(0.0),
        sum / latencies.len() as f64,
    )
}

/// Shared per-URL statistics. One lock covers the whole map.
#[derive(Debug, Default)]
pub struct TargetSet {
    targets: Mutex<HashMap<String, Target>>,
}

impl TargetSet {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let targets = urls
            .into_iter()
            .map(|url| {
                let url = url.into();
                (url.clone(), Target::new(url))
            })
            .collect();

        Self {
            targets: Mutex::new(targets),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.lock().is_empty()
    }

    /// Target URLs in unspecified order.
    pub fn urls(&self) -> Vec<String> {
        self.targets.lock().keys().cloned().collect()
    }

    /// Returns `false` (and records nothing) when `url` is not one of the targets.
    pub fn record_success(&self, url: &str, elapsed_secs: f64) -> bool {
        let mut targets = self.targets.lock();
        let Some(target) = targets.get_mut(url) else {
            tracing::debug!(url, "ignoring success for unknown target");
            return false;
        };
        target.latencies.push(elapsed_secs);
        target.successes = target.successes.saturating_add(1);
        true
    }

    /// Returns `false` (and records nothing) when `url` is not one of the targets.
    pub fn record_failure(&self, url: &str) -> bool {
        let mut targets = self.targets.lock();
        let Some(target) = targets.get_mut(url) else {
            tracing::debug!(url, "ignoring failure for unknown target");
            return false;
        };
        target.failures = target.failures.saturating_add(1);
        true
    }

    pub fn get(&self, url: &str) -> Option<Target> {
        self.targets.lock().get(url).cloned()
    }

    pub fn summarize(&self, url: &str) -> Option<TargetSummary> {
        self.targets.lock().get(url).map(Target::summarize)
    }

    /// Summaries of every target, sorted by URL.
    pub fn summaries(&self) -> Vec<TargetSummary> {
        let mut out: Vec<TargetSummary> = self
            .targets
            .lock()
            .values()
            .map(Target::summarize)
            .collect();
        out.sort_by(|a, b| a.url.cmp(&b.url));
        out
    }

    /// Sum of `successes + failures` across all targets.
    pub fn attempts_total(&self) -> u64 {
        self.targets
            .lock()
            .values()
            .fold(0u64, |acc, t| acc.saturating_add(t.attempts()))
    }
}
