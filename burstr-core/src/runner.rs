mod config;
mod dispatch;
mod error;
mod rate;
mod report;
mod run;
mod stats;
mod worker;

pub use config::{
    DEFAULT_LAUNCH_DELAY, DEFAULT_RATE_WINDOW, DEFAULT_REPORT_INTERVAL, DEFAULT_REQUESTS,
    DEFAULT_TARGETS, DEFAULT_TIMEOUT, RunConfig,
};
pub use dispatch::{CompletionSignal, DispatchReport, dispatch};
pub use error::{Error, Result};
pub use rate::RateCounter;
pub use report::{RateFn, RateSample, RateTicker};
pub use run::{RunSummary, run, run_http};
pub use stats::{Target, TargetSet, TargetSummary, min_max_avg};
pub use worker::{Fetcher, HttpFetcher, WorkerContext, WorkerReport, run_worker};
