//! Bounded exponential-backoff retries.
//!
//! One logical call runs as a loop over attempts `0..=max_retries`:
//! - success resolves the call immediately;
//! - a [`FailureClass::Terminal`] error is returned without retrying;
//! - a [`FailureClass::Retryable`] error at attempt `n < max_retries` waits
//!   `base_delay * 2^n` and re-issues the same operation;
//! - a retryable error at attempt `n >= max_retries` is returned as-is.
//!
//! The attempt counter is a local of [`RetryPolicy::run`]. Nothing about a
//! call is stored on the policy, so one policy can drive any number of
//! concurrent calls.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::sleeper::{Sleeper, TokioSleeper};

/// Retries after the initial attempt.
pub const MAX_RETRIES: usize = 3;

/// Delay before the first retry; doubled for each further retry.
pub const BASE_DELAY: Duration = Duration::from_millis(1_000);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// Repeating the request may succeed: no response, timeout or 5xx.
    Retryable,
    /// Repeating the request cannot change the outcome.
    Terminal,
}

/// Tells the retry loop whether an error is worth another attempt.
pub trait Classify {
    fn classify(&self) -> FailureClass;
}

/// Marker produced when a cancellation token fires mid-call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, thiserror::Error)]
#[error("cancelled")]
pub struct Cancelled;

/// What the loop does after a failed attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Retry { delay: Duration },
    Terminal,
    Exhausted,
}

#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    base_delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("sleeper", &self.sleeper)
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES, BASE_DELAY)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replaces the sleeper that applies backoff delays.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay before the retry that follows failed attempt `attempt`.
    ///
    /// `attempt` is zero-based, so the first retry waits exactly `base_delay`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exp = attempt.min(16) as u32;
        self.base_delay.saturating_mul(1u32 << exp)
    }

    /// Pure transition function of the retry state machine.
    pub fn decide<E: Classify>(&self, attempt: usize, err: &E) -> Decision {
        match err.classify() {
            FailureClass::Terminal => Decision::Terminal,
            FailureClass::Retryable if attempt < self.max_retries => Decision::Retry {
                delay: self.delay_for(attempt),
            },
            FailureClass::Retryable => Decision::Exhausted,
        }
    }

    /// Runs `operation` until it succeeds, fails terminally, or the retry
    /// budget is spent.
    ///
    /// `cancel` is checked before every attempt and interrupts a pending
    /// backoff delay; an in-flight attempt is left to finish.
    pub async fn run<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + From<Cancelled>,
    {
        let mut attempt = 0usize;
        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(Cancelled.into());
            }

            let err = match operation().await {
                Ok(value) => {
                    #[cfg(feature = "tracing")]
                    if attempt > 0 {
                        tracing::debug!(attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            match self.decide(attempt, &err) {
                Decision::Terminal => return Err(err),
                Decision::Exhausted => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        attempts = attempt + 1,
                        max_retries = self.max_retries,
                        "retry budget exhausted"
                    );
                    return Err(err);
                }
                Decision::Retry { delay } => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        retry = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request"
                    );

                    match cancel {
                        Some(token) => {
                            tokio::select! {
                                _ = token.cancelled() => return Err(Cancelled.into()),
                                _ = self.sleeper.sleep(delay) => {}
                            }
                        }
                        None => self.sleeper.sleep(delay).await,
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Wraps a single-attempt operation into one that retries.
    pub fn wrap<F>(&self, operation: F) -> Retrying<F> {
        Retrying {
            policy: self.clone(),
            operation,
        }
    }
}

/// A single-attempt operation bound to a [`RetryPolicy`].
///
/// Each `call` starts a fresh logical call with its own attempt counter.
#[derive(Clone, Debug)]
pub struct Retrying<F> {
    policy: RetryPolicy,
    operation: F,
}

impl<F> Retrying<F> {
    pub async fn call<T, E, Fut>(&self) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + From<Cancelled>,
    {
        self.policy.run(&self.operation, None).await
    }

    pub async fn call_with_cancel<T, E, Fut>(&self, cancel: &CancellationToken) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify + From<Cancelled>,
    {
        self.policy.run(&self.operation, Some(cancel)).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::{Cancelled, Classify, Decision, FailureClass, RetryPolicy};
    use crate::sleeper::TrackingSleeper;

    #[derive(Debug, PartialEq, Eq)]
    enum FakeError {
        Refused,
        Timeout,
        Status(u16),
        Cancelled,
    }

    impl Classify for FakeError {
        fn classify(&self) -> FailureClass {
            match self {
                Self::Refused | Self::Timeout => FailureClass::Retryable,
                Self::Status(status) if (500..=599).contains(status) => FailureClass::Retryable,
                _ => FailureClass::Terminal,
            }
        }
    }

    impl From<Cancelled> for FakeError {
        fn from(_: Cancelled) -> Self {
            Self::Cancelled
        }
    }

    /// Replays a fixed script of outcomes and counts attempts.
    #[derive(Clone)]
    struct Script {
        outcomes: Arc<Mutex<VecDeque<Result<&'static str, FakeError>>>>,
        attempts: Arc<AtomicUsize>,
    }

    impl Script {
        fn new(outcomes: Vec<Result<&'static str, FakeError>>) -> Self {
            Self {
                outcomes: Arc::new(Mutex::new(outcomes.into())),
                attempts: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        fn operation(
            &self,
        ) -> impl Fn() -> std::future::Ready<Result<&'static str, FakeError>> + '_ {
            move || {
                self.attempts.fetch_add(1, Ordering::SeqCst);
                let next = self
                    .outcomes
                    .lock()
                    .expect("script mutex must not be poisoned")
                    .pop_front()
                    .unwrap_or(Err(FakeError::Status(500)));
                std::future::ready(next)
            }
        }
    }

    fn policy(sleeper: &TrackingSleeper) -> RetryPolicy {
        RetryPolicy::default().with_sleeper(Arc::new(sleeper.clone()))
    }

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn delay_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn delay_saturates_for_huge_attempts() {
        let policy = RetryPolicy::new(usize::MAX, Duration::MAX);
        assert_eq!(policy.delay_for(40), Duration::MAX);
    }

    #[test]
    fn decide_walks_the_state_machine() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(0, &FakeError::Timeout),
            Decision::Retry {
                delay: Duration::from_millis(1000)
            }
        );
        assert_eq!(
            policy.decide(2, &FakeError::Status(503)),
            Decision::Retry {
                delay: Duration::from_millis(4000)
            }
        );
        assert_eq!(policy.decide(3, &FakeError::Refused), Decision::Exhausted);
        assert_eq!(policy.decide(0, &FakeError::Status(404)), Decision::Terminal);
    }

    #[tokio::test]
    async fn first_attempt_success_introduces_no_delay() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![Ok("ranking")]);

        let result = policy(&sleeper).run(script.operation(), None).await;

        assert_eq!(result, Ok("ranking"));
        assert_eq!(script.attempts(), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn client_fault_is_attempted_once() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![Err(FakeError::Status(404))]);

        let result = policy(&sleeper).run(script.operation(), None).await;

        assert_eq!(result, Err(FakeError::Status(404)));
        assert_eq!(script.attempts(), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn server_faults_then_success_returns_last_body() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![
            Err(FakeError::Status(500)),
            Err(FakeError::Status(500)),
            Err(FakeError::Status(500)),
            Ok("fourth"),
        ]);

        let result = policy(&sleeper).run(script.operation(), None).await;

        assert_eq!(result, Ok("fourth"));
        assert_eq!(script.attempts(), 4);
        assert_eq!(sleeper.calls(), ms(&[1000, 2000, 4000]));
    }

    #[tokio::test]
    async fn persistent_timeouts_exhaust_after_four_attempts() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new((0..10).map(|_| Err(FakeError::Timeout)).collect());

        let result = policy(&sleeper).run(script.operation(), None).await;

        assert_eq!(result, Err(FakeError::Timeout));
        assert_eq!(script.attempts(), 4);
        assert_eq!(sleeper.total(), Duration::from_millis(7000));
    }

    #[tokio::test]
    async fn refused_then_success_retries_once() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![Err(FakeError::Refused), Ok("recovered")]);

        let result = policy(&sleeper).run(script.operation(), None).await;

        assert_eq!(result, Ok("recovered"));
        assert_eq!(script.attempts(), 2);
        assert_eq!(sleeper.calls(), ms(&[1000]));
    }

    #[tokio::test]
    async fn terminal_error_after_retry_stops_immediately() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![Err(FakeError::Status(502)), Err(FakeError::Status(400))]);

        let result = policy(&sleeper).run(script.operation(), None).await;

        assert_eq!(result, Err(FakeError::Status(400)));
        assert_eq!(script.attempts(), 2);
        assert_eq!(sleeper.calls(), ms(&[1000]));
    }

    #[tokio::test]
    async fn wrapped_calls_do_not_share_attempt_counters() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![
            Err(FakeError::Status(500)),
            Ok("first call"),
            Err(FakeError::Status(500)),
            Ok("second call"),
        ]);
        let retrying = policy(&sleeper).wrap(script.operation());

        assert_eq!(retrying.call().await, Ok("first call"));
        assert_eq!(retrying.call().await, Ok("second call"));

        // Both calls start from attempt 0, so each waits the base delay only.
        assert_eq!(sleeper.calls(), ms(&[1000, 1000]));
    }

    #[tokio::test]
    async fn zero_retries_returns_first_retryable_error() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![Err(FakeError::Status(503)), Ok("unused")]);
        let policy =
            RetryPolicy::new(0, Duration::from_millis(1)).with_sleeper(Arc::new(sleeper.clone()));

        let result = policy.run(script.operation(), None).await;

        assert_eq!(result, Err(FakeError::Status(503)));
        assert_eq!(script.attempts(), 1);
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_prevents_any_attempt() {
        let sleeper = TrackingSleeper::new();
        let script = Script::new(vec![Ok("unused")]);
        let token = CancellationToken::new();
        token.cancel();

        let result = policy(&sleeper).run(script.operation(), Some(&token)).await;

        assert_eq!(result, Err(FakeError::Cancelled));
        assert_eq!(script.attempts(), 0);
    }

    #[tokio::test]
    async fn cancellation_interrupts_backoff() {
        let token = CancellationToken::new();
        let script = Script::new(vec![Err(FakeError::Refused), Ok("unused")]);
        // Real timer with a long delay: only cancellation can end the wait.
        let policy = RetryPolicy::new(3, Duration::from_secs(60));

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                token.cancel();
            })
        };

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            policy.run(script.operation(), Some(&token)),
        )
        .await
        .expect("cancellation must end the backoff wait");

        canceller.await.expect("canceller task must finish");
        assert_eq!(result, Err(FakeError::Cancelled));
        assert_eq!(script.attempts(), 1);
    }
}
