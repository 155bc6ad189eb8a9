use std::sync::Arc;
use std::time::Duration;

use super::config::RunConfig;
use super::dispatch::dispatch;
use super::error::Result;
use super::rate::RateCounter;
use super::report::{RateFn, RateTicker};
use super::stats::{TargetSet, TargetSummary};
use super::worker::{Fetcher, HttpFetcher};

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// One entry per target, sorted by URL.
    pub targets: Vec<TargetSummary>,
    pub workers: u64,
    pub aborted_workers: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Successful plus failed attempts across all targets.
    #[must_use]
    pub fn attempts_total(&self) -> u64 {
        self.targets.iter().fold(0u64, |acc, t| {
            acc.saturating_add(t.requests).saturating_add(t.failed)
        })
    }

    #[must_use]
    pub fn failed_total(&self) -> u64 {
        self.targets
            .iter()
            .fold(0u64, |acc, t| acc.saturating_add(t.failed))
    }
}

/// Validate `cfg`, run the whole burst with `fetcher` and summarize every target.
///
/// `on_rate` is called every `cfg.report_interval` while workers are in flight.
pub async fn run<F: Fetcher>(
    cfg: &RunConfig,
    fetcher: Arc<F>,
    on_rate: Option<RateFn>,
) -> Result<RunSummary> {
    cfg.validate()?;

    let targets = Arc::new(TargetSet::new(cfg.targets.iter().cloned()));
    let rate = Arc::new(RateCounter::new(cfg.rate_window));

    let ticker = on_rate.map(|f| RateTicker::spawn(rate.clone(), cfg.report_interval, f));

    let report = dispatch(
        cfg.requests,
        cfg.effective_launch_delay(),
        targets.clone(),
        rate,
        fetcher,
    )
    .await;

    if let Some(ticker) = ticker {
        ticker.stop();
    }
    let report = report?;

    Ok(RunSummary {
        targets: targets.summaries(),
        workers: report.completed,
        aborted_workers: report.aborted,
        elapsed: report.elapsed,
    })
}

/// [`run`] against real targets over HTTP(S).
pub async fn run_http(cfg: &RunConfig, on_rate: Option<RateFn>) -> Result<RunSummary> {
    cfg.validate()?;
    let fetcher = Arc::new(HttpFetcher::new(cfg.timeout));
    run(cfg, fetcher, on_rate).await
}
