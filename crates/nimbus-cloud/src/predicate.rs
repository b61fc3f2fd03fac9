//! Bounded polling for eventually consistent provider state
//!
//! Providers accept a request long before the resource behind it is
//! usable. [`retry_until`] bridges that gap: it re-evaluates a probe on a
//! fixed cadence until the probe holds or the wait budget is spent.
//!
//! Polling stops as soon as the returned future is dropped, so wrapping
//! it in `tokio::time::timeout`, `select!` or an aborted task cancels it
//! without running to the deadline.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep_until, timeout_at};

/// Wait budget and cadence for a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum time to wait for the condition
    pub timeout: Duration,

    /// Delay between two evaluations of the condition
    pub interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            interval: Duration::from_secs(1),
        }
    }
}

impl PollConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// Poll every `interval` for at most `timeout_ms` milliseconds
    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    /// A zero interval would re-evaluate the condition without ever yielding
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(CloudError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Evaluate `condition` at `interval` cadence until it yields `true` or
/// `timeout` elapses.
///
/// Tick `n` runs at `start + n * interval`; a tick scheduled after the
/// deadline is never run. An evaluation still in flight at the deadline
/// is dropped, so the loop never outlives its budget. Returns `Ok(false)`
/// on timeout. An error from the condition itself aborts the loop and is
/// returned as-is.
pub async fn retry_until<F, Fut>(config: &PollConfig, mut condition: F) -> Result<bool>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    config.validate()?;

    let start = Instant::now();
    let deadline = start
        .checked_add(config.timeout)
        .ok_or_else(|| CloudError::InvalidConfig("poll timeout is out of range".to_string()))?;
    let mut tick: u32 = 0;

    loop {
        match timeout_at(deadline, condition()).await {
            Ok(met) => {
                if met? {
                    tracing::debug!("Condition met after {} poll(s)", tick + 1);
                    return Ok(true);
                }
            }
            Err(_) => {
                tracing::debug!(
                    "Condition still pending at the {}ms deadline",
                    config.timeout.as_millis()
                );
                return Ok(false);
            }
        }

        tick = tick.saturating_add(1);
        let next = config
            .interval
            .checked_mul(tick)
            .and_then(|offset| start.checked_add(offset))
            .filter(|next| *next <= deadline && Instant::now() < deadline);
        let Some(next) = next else {
            tracing::debug!(
                "Condition not met within {}ms ({} poll(s))",
                config.timeout.as_millis(),
                tick
            );
            return Ok(false);
        };
        sleep_until(next).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Probe that first holds on tick `k` (0-based), counting evaluations
    fn true_at_tick(k: u32) -> (Arc<AtomicU32>, impl FnMut() -> std::future::Ready<Result<bool>>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let probe = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(n >= k))
        };
        (calls, probe)
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_just_before_tick() {
        let interval = Duration::from_millis(100);
        let config = PollConfig::new(interval * 3 - Duration::from_millis(1), interval);
        let (calls, probe) = true_at_tick(3);

        assert!(!retry_until(&config, probe).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_just_after_tick() {
        let interval = Duration::from_millis(100);
        let config = PollConfig::new(interval * 3 + Duration::from_millis(1), interval);
        let (calls, probe) = true_at_tick(3);

        assert!(retry_until(&config, probe).await.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_does_not_sleep() {
        let config = PollConfig::from_millis(1000, 100);
        let start = Instant::now();
        let (_, probe) = true_at_tick(0);

        assert!(retry_until(&config, probe).await.unwrap());
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_poll_completes_without_timer() {
        let config = PollConfig::default();
        let (calls, probe) = true_at_tick(0);

        let mut polling = tokio_test::task::spawn(retry_until(&config, probe));
        assert!(tokio_test::assert_ready_ok!(polling.poll()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_condition_error_propagates() {
        let config = PollConfig::from_millis(1000, 100);
        let result = retry_until(&config, || async {
            Err(CloudError::InvalidConfig("probe failed".to_string()))
        })
        .await;

        assert!(matches!(result, Err(CloudError::InvalidConfig(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_future_stops_polling() {
        let config = PollConfig::from_millis(60_000, 100);
        let (calls, probe) = true_at_tick(u32::MAX);

        let outcome =
            tokio::time::timeout(Duration::from_millis(250), retry_until(&config, probe)).await;
        assert!(outcome.is_err());

        let seen = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_condition_stops_at_deadline() {
        let config = PollConfig::from_millis(10_000, 1_000);
        let start = Instant::now();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let met = retry_until(&config, || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(false)
            }
        })
        .await
        .unwrap();

        assert!(!met);
        assert!(start.elapsed() <= config.timeout);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_condition_is_cut_at_deadline() {
        let config = PollConfig::from_millis(3_000, 1_000);
        let start = Instant::now();

        let met = retry_until(&config, || std::future::pending::<Result<bool>>())
            .await
            .unwrap();

        assert!(!met);
        assert_eq!(start.elapsed(), config.timeout);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_rejected() {
        let config = PollConfig::from_millis(10, 0);
        let (calls, probe) = true_at_tick(u32::MAX);

        let result = retry_until(&config, probe).await;
        assert!(matches!(result, Err(CloudError::InvalidConfig(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(PollConfig::default().validate().is_ok());
    }
}
