//! Waiting on asynchronous jobs: repeated status checks with exponential backoff
//! and an optional overall deadline.
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::engine::OcrError;

/// How often and for how long a pending job is polled.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// Wait after the first pending status.
    pub initial_delay: Duration,
    /// Upper bound for the doubling backoff.
    pub max_delay: Duration,
    /// Overall deadline; `None` waits until the job reaches a terminal state.
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl PollPolicy {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_delay)
    }
}

/// Outcome of a single status check.
#[derive(Debug)]
pub enum PollState<T> {
    Pending,
    Ready(T),
}

/// Calls `check` until it reports `Ready`, sleeping between attempts.
///
/// Errors from `check` end the wait immediately. When the policy carries a
/// timeout it bounds the whole wait, including a check that never returns;
/// once it elapses `OcrError::Timeout` is returned.
pub async fn poll_until<T, F, Fut>(policy: &PollPolicy, mut check: F) -> Result<T, OcrError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollState<T>, OcrError>>,
{
    let started = Instant::now();
    let mut backoff = policy.initial_delay;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let state = match policy.timeout {
            Some(timeout) => {
                let remaining = timeout.saturating_sub(started.elapsed());
                match tokio::time::timeout(remaining, check()).await {
                    Ok(state) => state?,
                    Err(_) => {
                        tracing::warn!(attempts, ?timeout, "status check did not return in time");
                        return Err(OcrError::Timeout(timeout));
                    }
                }
            }
            None => check().await?,
        };
        if let PollState::Ready(value) = state {
            tracing::debug!(attempts, elapsed = ?started.elapsed(), "job reached a terminal state");
            return Ok(value);
        }

        let wait = match policy.timeout {
            Some(timeout) => {
                let elapsed = started.elapsed();
                if elapsed >= timeout {
                    tracing::warn!(attempts, ?timeout, "gave up waiting on pending job");
                    return Err(OcrError::Timeout(timeout));
                }
                backoff.min(timeout - elapsed)
            }
            None => backoff,
        };

        tracing::trace!(attempts, ?wait, "job still pending");
        tokio::time::sleep(wait).await;
        backoff = policy.next_delay(backoff);
    }
}
