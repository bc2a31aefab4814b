use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{debug, warn};

/// Attempt budget and bounded, incremental wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            retries,
            min_delay,
            max_delay: max_delay.max(min_delay),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Waits between attempts: `min_delay`, doubling, capped at `max_delay`.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        // base 2 yields 2, 4, 8... so a factor of min/2 starts at min
        let min_ms = u64::try_from(self.min_delay.as_millis()).unwrap_or(u64::MAX);
        ExponentialBackoff::from_millis(2)
            .factor(min_ms / 2)
            .max_delay(self.max_delay)
            .take(self.retries as usize)
    }
}

/// Side channel notified on every failed attempt. Kept out of the retry loop so
/// progress reporting can be swapped without touching the backoff logic.
pub trait RetryObserver: Send + Sync {
    fn on_failed_attempt(&self, label: &str, attempt: u32, retries_left: u32, error: &dyn Display);
}

pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn on_failed_attempt(&self, label: &str, attempt: u32, retries_left: u32, error: &dyn Display) {
        if retries_left > 0 {
            debug!("{label}: attempt {} failed ({error}), {retries_left} retries left", attempt + 1);
        } else {
            warn!("{label}: giving up after {} attempts ({error})", attempt + 1);
        }
    }
}

pub struct SilentObserver;

impl RetryObserver for SilentObserver {
    fn on_failed_attempt(&self, _: &str, _: u32, _: u32, _: &dyn Display) {}
}

/// Run `op` until it succeeds or the policy is exhausted, returning the last error.
pub async fn retry<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    observer: &dyn RetryObserver,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let retries = policy.retries;
    let mut attempt = 0u32;

    Retry::spawn(policy.strategy(), || {
        let current = attempt;
        attempt += 1;
        let fut = op();
        async move {
            let res = fut.await;
            if let Err(err) = &res {
                let retries_left = retries - current.min(retries);
                observer.on_failed_attempt(label, current, retries_left, err);
            }
            res
        }
    })
    .await
}

// region:        --- Tests


// endregion:     --- Tests
