//! Where the retry loop waits out its backoff.
//!
//! [`RetryPolicy`](crate::RetryPolicy) never touches the timer itself. Clients
//! sleep on [`TokioSleeper`]; tests hand in a [`TrackingSleeper`] and assert on
//! the backoff schedule without waiting for it.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type SleepFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Waits out one backoff delay. Dropping the future abandons the wait.
    fn sleep(&self, delay: Duration) -> SleepFuture;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, delay: Duration) -> SleepFuture {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// Logs each backoff delay and resolves at once.
///
/// Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct TrackingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backoff delays in the order the retry loop asked for them.
    pub fn calls(&self) -> Vec<Duration> {
        self.with_log(|delays| delays.clone())
    }

    /// Time the retry loop would have spent waiting.
    pub fn total(&self) -> Duration {
        self.with_log(|delays| delays.iter().sum())
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut Vec<Duration>) -> R) -> R {
        // A panicking test thread must not hide the delays logged before it.
        let mut delays = match self.delays.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut delays)
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, delay: Duration) -> SleepFuture {
        self.with_log(|delays| delays.push(delay));
        Box::pin(std::future::ready(()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{Sleeper, TokioSleeper, TrackingSleeper};

    #[tokio::test]
    async fn clones_share_the_backoff_log() {
        let client_side = TrackingSleeper::new();
        let test_side = client_side.clone();

        for delay in [1000, 2000, 4000] {
            client_side.sleep(Duration::from_millis(delay)).await;
        }

        assert_eq!(
            test_side.calls(),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(2000),
                Duration::from_millis(4000)
            ]
        );
        assert_eq!(test_side.total(), Duration::from_millis(7000));
    }

    #[tokio::test]
    async fn tracking_does_not_wait() {
        let started = Instant::now();
        TrackingSleeper::new().sleep(Duration::from_secs(30)).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_sleeper_waits_on_the_timer() {
        let started = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_millis(1000)).await;
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }
}
