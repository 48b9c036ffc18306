//! Polling backoff for "no data yet" outcomes
//!
//! The queue never waits or retries on its own. Callers that get nothing
//! to read sleep according to a [`PollPolicy`] and try again.

use std::time::Duration;
use tokio::time::sleep;

/// Backoff between empty polls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay after the first empty poll
    pub initial_delay: Duration,
    /// Upper bound for the delay
    pub max_delay: Duration,
    /// Consecutive empty polls before giving up, `None` to poll forever
    pub max_attempts: Option<usize>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(100),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Delay before the given (zero-based) retry: doubles each time, capped
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31) as u32).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

/// Backoff state for one polling loop
#[derive(Debug)]
pub struct Backoff {
    policy: PollPolicy,
    attempt: usize,
}

impl Backoff {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Call after a poll that produced data
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Sleep after an empty poll. Returns false once the attempt budget is spent.
    pub async fn wait(&mut self) -> bool {
        if let Some(max) = self.policy.max_attempts {
            if self.attempt >= max {
                return false;
            }
        }
        let delay = self.policy.delay_for(self.attempt);
        self.attempt += 1;
        sleep(delay).await;
        true
    }

    /// Consecutive empty polls so far
    pub fn attempts(&self) -> usize {
        self.attempt
    }
}
