use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Sliding-window event counter.
///
/// `rate()` counts the events marked within the trailing `window`, inclusive of now.
/// Old marks expire as the window slides; there is no explicit reset.
#[derive(Debug)]
pub struct RateCounter {
    window: Duration,
    marks: Mutex<VecDeque<Instant>>,
}

impl RateCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            marks: Mutex::new(VecDeque::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn mark(&self) {
        let now = Instant::now();
        let mut marks = self.marks.lock();
        expire(&mut marks, now, self.window);
        marks.push_back(now);
    }

    pub fn rate(&self) -> u64 {
        let now = Instant::now();
        let mut marks = self.marks.lock();
        expire(&mut marks, now, self.window);
        marks.len() as u64
    }
}

fn expire(marks: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&oldest) = marks.front() {
        if now.saturating_duration_since(oldest) < window {
            break;
        }
        marks.pop_front();
    }
}
