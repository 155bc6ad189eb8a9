use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::rate::RateCounter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSample {
    /// Monotonic tick counter (1-based).
    pub tick: u64,
    pub elapsed: Duration,
    /// Requests issued within the trailing rate window.
    pub rate: u64,
}

pub type RateFn = Arc<dyn Fn(RateSample) + Send + Sync + 'static>;

/// Periodic observer of a [`RateCounter`]. Stops when dropped.
#[derive(Debug)]
pub struct RateTicker {
    handle: JoinHandle<()>,
}

impl RateTicker {
    /// First sample is taken one `interval` after spawning.
    pub fn spawn(rate: Arc<RateCounter>, interval: Duration, on_rate: RateFn) -> Self {
        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = tokio::time::interval_at(started + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut tick: u64 = 0;
            loop {
                ticker.tick().await;
                tick = tick.saturating_add(1);
                (on_rate)(RateSample {
                    tick,
                    elapsed: started.elapsed(),
                    rate: rate.rate(),
                });
            }
        });

        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for RateTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
