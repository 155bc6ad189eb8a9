use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::{Duration, sleep};

pub const PATH_HELLO: &str = "/hello";
pub const PATH_SLOW: &str = "/slow";
pub const PATH_HANG: &str = "/hang";
pub const PATH_LARGE: &str = "/large";
pub const PATH_ERROR: &str = "/error";
/// Redirects to `/hello` with a relative `Location`.
pub const PATH_REDIRECT: &str = "/redirect";
/// Redirects to itself forever.
pub const PATH_REDIRECT_LOOP: &str = "/redirect-loop";

/// Size of the `/large` response body.
pub const LARGE_BODY_BYTES: usize = 256 * 1024;

/// How long `/slow` waits before responding.
pub const SLOW_DELAY: Duration = Duration::from_millis(50);

/// How long `/hang` waits before responding. Long enough to trip any client timeout in tests.
pub const HANG_DELAY: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct TestServerStats {
    requests_total: Arc<AtomicU64>,
}

impl TestServerStats {
    fn inc_requests_total(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone)]
pub struct TestServerUrls {
    pub hello: String,
    pub slow: String,
    pub hang: String,
    pub large: String,
    pub error: String,
    pub redirect: String,
    pub redirect_loop: String,
}

impl TestServerUrls {
    pub fn new(base_url: &str) -> Self {
        Self {
            hello: format!("{base_url}{PATH_HELLO}"),
            slow: format!("{base_url}{PATH_SLOW}"),
            hang: format!("{base_url}{PATH_HANG}"),
            large: format!("{base_url}{PATH_LARGE}"),
            error: format!("{base_url}{PATH_ERROR}"),
            redirect: format!("{base_url}{PATH_REDIRECT}"),
            redirect_loop: format!("{base_url}{PATH_REDIRECT_LOOP}"),
        }
    }
}

pub struct TestServer {
    urls: TestServerUrls,
    stats: TestServerStats,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

async fn handle_hello(State(stats): State<TestServerStats>) -> &'static str {
    stats.inc_requests_total();
    "Hello World!"
}

async fn handle_slow(State(stats): State<TestServerStats>) -> &'static str {
    stats.inc_requests_total();
    sleep(SLOW_DELAY).await;
    "slow"
}

async fn handle_hang(State(stats): State<TestServerStats>) -> &'static str {
    stats.inc_requests_total();
    sleep(HANG_DELAY).await;
    "finally"
}

async fn handle_large(State(stats): State<TestServerStats>) -> Vec<u8> {
    stats.inc_requests_total();
    vec![b'x'; LARGE_BODY_BYTES]
}

async fn handle_error(State(stats): State<TestServerStats>) -> (StatusCode, &'static str) {
    stats.inc_requests_total();
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn handle_redirect(State(stats): State<TestServerStats>) -> Redirect {
    stats.inc_requests_total();
    Redirect::temporary(PATH_HELLO)
}

async fn handle_redirect_loop(State(stats): State<TestServerStats>) -> Redirect {
    stats.inc_requests_total();
    Redirect::temporary(PATH_REDIRECT_LOOP)
}

pub fn router(stats: TestServerStats) -> Router {
    Router::new()
        .route(PATH_HELLO, get(handle_hello))
        .route(PATH_SLOW, get(handle_slow))
        .route(PATH_HANG, get(handle_hang))
        .route(PATH_LARGE, get(handle_large))
        .route(PATH_ERROR, get(handle_error))
        .route(PATH_REDIRECT, get(handle_redirect))
        .route(PATH_REDIRECT_LOOP, get(handle_redirect_loop))
        .with_state(stats)
}

impl TestServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let stats = TestServerStats::default();

        let app = router(stats.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        let urls = TestServerUrls::new(&format!("http://{addr}"));

        Ok(Self {
            urls,
            stats,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn urls(&self) -> &TestServerUrls {
        &self.urls
    }

    pub fn stats(&self) -> &TestServerStats {
        &self.stats
    }

    /// Stop accepting connections. In-flight `/hang` requests are aborted with the task.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some()
            && let Some(task) = self.task.take()
        {
            task.abort();
        }
    }
}
