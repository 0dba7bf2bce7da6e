use std::time::{Duration, Instant};

/// Enforces a minimum idle gap between one response and the next request
#[derive(Debug, Clone)]
pub struct Pacer {
    /// Minimum time between a response and the next request
    min_interval: Duration,

    /// When the last response finished
    last_response: Option<Instant>,

    /// Total time spent waiting
    waited: Duration,
}

impl Pacer {
    /// Creates a pacer that has not seen any response yet
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_response: None,
            waited: Duration::ZERO,
        }
    }

    /// Time left before the next request may be sent
    ///
    /// Zero for the first request, and once the interval has elapsed.
    pub fn time_until_ready(&self, now: Instant) -> Duration {
        match self.last_response {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Records that a response finished at `at`
    pub fn record_response(&mut self, at: Instant) {
        self.last_response = Some(at);
    }

    /// Records that a response just finished
    pub fn response_done(&mut self) {
        self.record_response(Instant::now());
    }

    /// Sleeps until a request may be sent
    pub async fn wait(&mut self) {
        let delay = self.time_until_ready(Instant::now());
        if !delay.is_zero() {
            tracing::debug!("Pacing: waiting {}ms before next request", delay.as_millis());
            tokio::time::sleep(delay).await;
            self.waited += delay;
        }
    }

    /// Total time this pacer has slept
    pub fn total_waited(&self) -> Duration {
        self.waited
    }
}
