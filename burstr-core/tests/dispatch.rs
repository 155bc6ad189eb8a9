use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use burstr_core::runner::{Fetcher, RateCounter, RateSample, RunConfig, TargetSet, dispatch, run};
use burstr_core::{HttpError, HttpResponse};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
enum Behavior {
    /// Respond after each latency in turn, cycling.
    Respond(Vec<Duration>),
    Fail,
    /// Panic on the first call, then respond after the given latency.
    PanicFirst(Duration),
}

#[derive(Debug)]
struct ScriptedFetcher {
    behaviors: HashMap<String, Behavior>,
    cursors: Mutex<HashMap<String, usize>>,
}

impl ScriptedFetcher {
    fn new(behaviors: &[(&str, Behavior)]) -> Self {
        Self {
            behaviors: behaviors
                .iter()
                .map(|(url, b)| ((*url).to_string(), b.clone()))
                .collect(),
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Zero-based index of this call for `url`.
    fn next_call(&self, url: &str) -> usize {
        let mut cursors = self.cursors.lock();
        let cursor = cursors.entry(url.to_string()).or_insert(0);
        let call = *cursor;
        *cursor += 1;
        call
    }

    fn next_latency(&self, url: &str, latencies: &[Duration]) -> Duration {
        latencies[self.next_call(url) % latencies.len()]
    }
}

impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> burstr_core::HttpResult<HttpResponse> {
        match self.behaviors.get(url) {
            Some(Behavior::Respond(latencies)) => {
                let latency = self.next_latency(url, latencies);
                tokio::time::sleep(latency).await;
                Ok(HttpResponse {
                    status: 200,
                    body_bytes: 2,
                })
            }
            Some(Behavior::PanicFirst(latency)) => {
                if self.next_call(url) == 0 {
                    panic!("scripted first-call panic for {url}");
                }
                tokio::time::sleep(*latency).await;
                Ok(HttpResponse {
                    status: 200,
                    body_bytes: 2,
                })
            }
            Some(Behavior::Fail) | None => {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Err(HttpError::Timeout(Duration::from_millis(5)))
            }
        }
    }
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[tokio::test(start_paused = true)]
async fn every_worker_attempts_every_target() -> anyhow::Result<()> {
    let targets = urls(&["http://a.test/", "http://b.test/", "http://c.test/"]);
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        ("http://a.test/", Behavior::Respond(vec![ms(10), ms(30)])),
        ("http://b.test/", Behavior::Respond(vec![ms(20)])),
        ("http://c.test/", Behavior::Fail),
    ]));

    let set = Arc::new(TargetSet::new(targets.iter().cloned()));
    let rate = Arc::new(RateCounter::new(Duration::from_secs(1)));
    let report = dispatch(25, None, set.clone(), rate, fetcher).await?;

    anyhow::ensure!(report.launched == 25, "launched {}", report.launched);
    anyhow::ensure!(report.completed == 25, "completed {}", report.completed);
    anyhow::ensure!(report.aborted == 0, "aborted {}", report.aborted);
    anyhow::ensure!(
        set.attempts_total() == 25 * 3,
        "attempts {}",
        set.attempts_total()
    );

    for url in &targets {
        let t = set
            .get(url)
            .ok_or_else(|| anyhow::anyhow!("missing {url}"))?;
        anyhow::ensure!(t.attempts() == 25, "{url}: attempts {}", t.attempts());
    }

    let c = set
        .get("http://c.test/")
        .ok_or_else(|| anyhow::anyhow!("missing c"))?;
    anyhow::ensure!(c.failures == 25 && c.latencies.is_empty(), "{c:?}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn failing_target_still_yields_all_completions() -> anyhow::Result<()> {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "http://down.test/",
        Behavior::Fail,
    )]));
    let set = Arc::new(TargetSet::new(["http://down.test/"]));
    let rate = Arc::new(RateCounter::new(Duration::from_secs(1)));

    let report = dispatch(10, None, set.clone(), rate, fetcher).await?;

    anyhow::ensure!(report.completed == 10, "completed {}", report.completed);
    let s = set
        .summarize("http://down.test/")
        .ok_or_else(|| anyhow::anyhow!("missing target"))?;
    anyhow::ensure!(s.failed == 10 && s.requests == 0, "{s:?}");
    anyhow::ensure!(s.avg.is_nan(), "expected NaN average, got {}", s.avg);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn panicking_worker_still_signals_completion() -> anyhow::Result<()> {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "http://flaky.test/",
        Behavior::PanicFirst(ms(100)),
    )]));
    let set = Arc::new(TargetSet::new(["http://flaky.test/"]));
    let rate = Arc::new(RateCounter::new(Duration::from_secs(1)));

    let report = dispatch(3, None, set.clone(), rate, fetcher).await?;

    anyhow::ensure!(report.completed == 3, "completed {}", report.completed);
    anyhow::ensure!(report.aborted == 1, "aborted {}", report.aborted);

    // The surviving workers finished their attempts before dispatch returned.
    let t = set
        .get("http://flaky.test/")
        .ok_or_else(|| anyhow::anyhow!("missing target"))?;
    anyhow::ensure!(t.successes == 2 && t.latencies.len() == 2, "{t:?}");
    anyhow::ensure!(report.elapsed >= ms(100), "elapsed {:?}", report.elapsed);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn dispatch_returns_only_after_workers_finish() -> anyhow::Result<()> {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "http://ok.test/",
        Behavior::Respond(vec![ms(100)]),
    )]));
    let set = Arc::new(TargetSet::new(["http://ok.test/"]));
    let rate = Arc::new(RateCounter::new(Duration::from_secs(1)));

    let report = dispatch(3, None, set.clone(), rate, fetcher).await?;

    anyhow::ensure!(report.aborted == 0, "aborted {}", report.aborted);
    anyhow::ensure!(set.attempts_total() == 3, "attempts {}", set.attempts_total());
    anyhow::ensure!(report.elapsed >= ms(100), "elapsed {:?}", report.elapsed);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn launch_delay_spreads_workers_over_time() -> anyhow::Result<()> {
    let fetcher = Arc::new(ScriptedFetcher::new(&[(
        "http://a.test/",
        Behavior::Respond(vec![ms(100)]),
    )]));
    let set = Arc::new(TargetSet::new(["http://a.test/"]));
    let rate = Arc::new(RateCounter::new(Duration::from_secs(1)));

    let report = dispatch(4, Some(ms(500)), set.clone(), rate, fetcher).await?;

    // Last worker launches at 1.5s and needs 100ms.
    anyhow::ensure!(
        report.elapsed >= ms(1600) && report.elapsed < ms(1700),
        "elapsed {:?}",
        report.elapsed
    );
    anyhow::ensure!(report.completed == 4, "completed {}", report.completed);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_summarizes_each_target() -> anyhow::Result<()> {
    let cfg = RunConfig {
        targets: urls(&["http://a.test/", "http://b.test/"]),
        requests: 4,
        launch_delay: None,
        ..RunConfig::default()
    };
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        ("http://a.test/", Behavior::Respond(vec![ms(100), ms(200)])),
        ("http://b.test/", Behavior::Respond(vec![ms(200), ms(100)])),
    ]));

    let summary = run(&cfg, fetcher, None).await?;

    anyhow::ensure!(summary.workers == 4, "workers {}", summary.workers);
    anyhow::ensure!(summary.attempts_total() == 8, "{summary:?}");
    anyhow::ensure!(summary.failed_total() == 0, "{summary:?}");
    anyhow::ensure!(summary.targets.len() == 2, "{summary:?}");

    for t in &summary.targets {
        anyhow::ensure!(t.requests == 4 && t.failed == 0, "{t:?}");
        // Two workers saw 0.1s, two saw 0.2s.
        anyhow::ensure!((t.min - 0.1).abs() < 2e-3, "{t:?}");
        anyhow::ensure!((t.max - 0.2).abs() < 2e-3, "{t:?}");
        anyhow::ensure!((t.avg - 0.15).abs() < 2e-3, "{t:?}");
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn run_reports_live_rate_while_in_flight() -> anyhow::Result<()> {
    let cfg = RunConfig {
        targets: urls(&["http://a.test/", "http://b.test/"]),
        requests: 6,
        launch_delay: Some(ms(500)),
        ..RunConfig::default()
    };
    let fetcher = Arc::new(ScriptedFetcher::new(&[
        ("http://a.test/", Behavior::Respond(vec![ms(100)])),
        ("http://b.test/", Behavior::Respond(vec![ms(100)])),
    ]));

    let samples: Arc<Mutex<Vec<RateSample>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = samples.clone();
    let summary = run(
        &cfg,
        fetcher,
        Some(Arc::new(move |s: RateSample| sink.lock().push(s))),
    )
    .await?;
    anyhow::ensure!(summary.attempts_total() == 12, "{summary:?}");

    // Workers launch over 2.5s and take 200ms each: ticks at 1s and 2s.
    let samples = samples.lock().clone();
    anyhow::ensure!(samples.len() == 2, "{samples:?}");
    for (i, s) in samples.iter().enumerate() {
        anyhow::ensure!(s.tick == i as u64 + 1, "{samples:?}");
        // Two workers (four requests) start in any one-second window.
        anyhow::ensure!((1..=6).contains(&s.rate), "{samples:?}");
    }
    Ok(())
}

#[tokio::test]
async fn run_rejects_invalid_config_before_dispatch() {
    let cfg = RunConfig {
        requests: 0,
        ..RunConfig::default()
    };
    let fetcher = Arc::new(ScriptedFetcher::new(&[]));
    let res = run(&cfg, fetcher, None).await;
    assert!(matches!(
        res,
        Err(burstr_core::runner::Error::InvalidRequests)
    ));
}
