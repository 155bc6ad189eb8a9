use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use burstr_http::{HttpClient, HttpRequest, HttpResponse};
use tokio::time::Instant;

use super::rate::RateCounter;
use super::stats::TargetSet;

/// Performs one GET against a target URL, draining the body.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = burstr_http::Result<HttpResponse>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: HttpClient,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: HttpClient::new(Some(timeout)),
            timeout,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = burstr_http::Result<HttpResponse>> + Send {
        self.client.request(HttpRequest::get(url).with_timeout(self.timeout))
    }
}

pub struct WorkerContext<F> {
    pub worker_id: u64,
    /// URLs to visit, each exactly once.
    pub urls: Arc<[String]>,
    pub targets: Arc<TargetSet>,
    pub rate: Arc<RateCounter>,
    pub fetcher: Arc<F>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker_id: u64,
    pub succeeded: u64,
    pub failed: u64,
}

/// Attempt every URL once. Failures are counted and the worker moves on; nothing is retried.
pub async fn run_worker<F: Fetcher>(ctx: WorkerContext<F>) -> WorkerReport {
    let mut report = WorkerReport {
        worker_id: ctx.worker_id,
        ..WorkerReport::default()
    };

    tracing::trace!(worker = ctx.worker_id, "worker started");

    for url in ctx.urls.iter() {
        ctx.rate.mark();
        let started = Instant::now();

        match ctx.fetcher.fetch(url).await {
            Ok(res) => {
                let elapsed = started.elapsed().as_secs_f64();
                tracing::debug!(
                    worker = ctx.worker_id,
                    url = %url,
                    status = res.status,
                    body_bytes = res.body_bytes,
                    elapsed_secs = elapsed,
                    "request done"
                );
                ctx.targets.record_success(url, elapsed);
                report.succeeded += 1;
            }
            Err(err) => {
                tracing::warn!(
                    worker = ctx.worker_id,
                    url = %url,
                    kind = %err.transport_error_kind(),
                    error = %err,
                    "request failed"
                );
                ctx.targets.record_failure(url);
                report.failed += 1;
            }
        }
    }

    tracing::trace!(
        worker = ctx.worker_id,
        succeeded = report.succeeded,
        failed = report.failed,
        "worker finished"
    );

    report
}
