use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::error::{Error, Result};
use super::rate::RateCounter;
use super::stats::TargetSet;
use super::worker::{Fetcher, WorkerContext, WorkerReport, run_worker};

/// Token a worker sends exactly once when it is done with all its targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionSignal {
    pub worker_id: u64,
    /// `None` when the worker task died before producing a report.
    pub report: Option<WorkerReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub launched: u64,
    pub completed: u64,
    /// Workers whose task ended without a report (panicked).
    pub aborted: u64,
    pub elapsed: Duration,
}

/// Sends the completion signal when dropped, so a worker that unwinds still signals once.
struct CompletionGuard {
    worker_id: u64,
    report: Option<WorkerReport>,
    tx: mpsc::UnboundedSender<CompletionSignal>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(CompletionSignal {
            worker_id: self.worker_id,
            report: self.report.take(),
        });
    }
}

/// Owns the guard for the whole worker run; the signal goes out when this future finishes or unwinds.
async fn run_guarded<F: Fetcher>(mut guard: CompletionGuard, ctx: WorkerContext<F>) {
    guard.report = Some(run_worker(ctx).await);
}

/// Launch `requests` workers, each visiting every target once, and wait for all of them.
///
/// With `launch_delay` set, launches are spaced by that delay; otherwise the whole burst is
/// spawned at once. Individual request failures never end the run early.
pub async fn dispatch<F: Fetcher>(
    requests: u64,
    launch_delay: Option<Duration>,
    targets: Arc<TargetSet>,
    rate: Arc<RateCounter>,
    fetcher: Arc<F>,
) -> Result<DispatchReport> {
    let started = Instant::now();
    let urls: Arc<[String]> = targets.urls().into();

    // Unbounded: every worker must be able to signal without waiting on the receiver.
    let (tx, mut rx) = mpsc::unbounded_channel::<CompletionSignal>();

    tracing::debug!(
        requests,
        targets = urls.len(),
        launch_delay = ?launch_delay,
        "dispatching workers"
    );

    for worker_id in 1..=requests {
        let guard = CompletionGuard {
            worker_id,
            report: None,
            tx: tx.clone(),
        };
        let ctx = WorkerContext {
            worker_id,
            urls: urls.clone(),
            targets: targets.clone(),
            rate: rate.clone(),
            fetcher: fetcher.clone(),
        };

        tokio::spawn(run_guarded(guard, ctx));

        if let Some(delay) = launch_delay
            && worker_id < requests
        {
            tokio::time::sleep(delay).await;
        }
    }
    drop(tx);

    let mut completed = 0u64;
    let mut aborted = 0u64;
    while completed < requests {
        match rx.recv().await {
            Some(signal) => {
                completed += 1;
                if signal.report.is_none() {
                    aborted += 1;
                    tracing::warn!(worker = signal.worker_id, "worker ended without a report");
                }
                tracing::trace!(worker = signal.worker_id, completed, "worker completed");
            }
            None => {
                return Err(Error::CompletionChannelClosed {
                    expected: requests,
                    received: completed,
                });
            }
        }
    }
    rx.close();

    let elapsed = started.elapsed();
    tracing::debug!(completed, aborted, elapsed = ?elapsed, "all workers completed");

    Ok(DispatchReport {
        launched: requests,
        completed,
        aborted,
        elapsed,
    })
}
