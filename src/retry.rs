//! Retry loop with exponential backoff.
//!
//! [`retry_operation`] runs an async operation until it succeeds, runs out of
//! attempts, or produces an error that [`RetryOptions`] says is not worth
//! retrying. Every failure is funnelled through
//! [`normalize_error`](crate::normalize_error) first, so the caller always
//! ends with an [`AppError`].
//!
//! # Timing
//!
//! With backoff enabled the wait after attempt `n` is `delay * 2^(n-1)`.
//! There is no wait after the final attempt and no overall deadline.
//!
//! ```rust,no_run
//! use hireline_errors::retry::{retry_operation, RetryOptions};
//! use std::time::Duration;
//!
//! # async fn fetch_jobs() -> Result<Vec<String>, std::io::Error> { Ok(vec![]) }
//! # async fn run() -> hireline_errors::Result<()> {
//! let jobs = retry_operation(
//!     || fetch_jobs(),
//!     RetryOptions::new().max_attempts(5).delay(Duration::from_millis(250)),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::classify::{is_retryable_error, normalize_error};
use crate::definitions::{DEFAULT_RETRY_DELAY, MAX_RETRY_ATTEMPTS};
use crate::models::{AppError, Thrown};
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

/// Predicate deciding whether a normalized error is worth another attempt.
pub type ShouldRetry = Arc<dyn Fn(&AppError) -> bool + Send + Sync>;

/// Hook invoked before each wait with the attempt number that just failed.
pub type OnRetry = Arc<dyn Fn(u32, &AppError) + Send + Sync>;

/// Knobs for [`retry_operation`].
#[derive(Clone)]
pub struct RetryOptions {
    max_attempts: u32,
    delay: Duration,
    backoff: bool,
    should_retry: Option<ShouldRetry>,
    on_retry: Option<OnRetry>,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRY_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            backoff: true,
            should_retry: None,
            on_retry: None,
        }
    }
}

impl RetryOptions {
    /// Three attempts, one second base delay, exponential backoff.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total attempts including the first. Zero is treated as one.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Base delay between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Toggle exponential backoff.
    #[must_use]
    pub fn backoff(mut self, enabled: bool) -> Self {
        self.backoff = enabled;
        self
    }

    /// Replace the default [`is_retryable_error`] predicate.
    #[must_use]
    pub fn should_retry(mut self, predicate: impl Fn(&AppError) -> bool + Send + Sync + 'static) -> Self {
        self.should_retry = Some(Arc::new(predicate));
        self
    }

    /// Install a hook called before each wait.
    #[must_use]
    pub fn on_retry(mut self, hook: impl Fn(u32, &AppError) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    /// Add a hook that runs after any already installed one.
    #[must_use]
    pub(crate) fn also_on_retry(mut self, hook: impl Fn(u32, &AppError) + Send + Sync + 'static) -> Self {
        self.on_retry = Some(match self.on_retry.take() {
            Some(first) => Arc::new(move |attempt, error: &AppError| {
                first(attempt, error);
                hook(attempt, error);
            }),
            None => Arc::new(hook),
        });
        self
    }

    /// Configured attempt limit.
    #[inline]
    pub const fn attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Configured base delay.
    #[inline]
    pub const fn base_delay(&self) -> Duration {
        self.delay
    }

    /// Wait that follows the failed `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if !self.backoff {
            return self.delay;
        }
        match 2u32.checked_pow(attempt.saturating_sub(1)) {
            Some(factor) => self.delay.checked_mul(factor).unwrap_or(Duration::MAX),
            None if self.delay.is_zero() => Duration::ZERO,
            None => Duration::MAX,
        }
    }

    fn wants_retry(&self, error: &AppError) -> bool {
        match &self.should_retry {
            Some(predicate) => predicate(error),
            None => is_retryable_error(error),
        }
    }

    fn notify(&self, attempt: u32, error: &AppError) {
        let Some(hook) = &self.on_retry else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| hook(attempt, error))).is_err() {
            tracing::warn!(attempt, code = %error.code(), "on_retry hook panicked; continuing");
        }
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .field("backoff", &self.backoff)
            .field("should_retry", &self.should_retry.as_ref().map(|_| "<custom>"))
            .field("on_retry", &self.on_retry.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// Run `operation` until it succeeds or retrying stops making sense.
///
/// Returns the operation's own value on success, or the normalized error of
/// the last attempt.
pub async fn retry_operation<T, E, F, Fut>(mut operation: F, options: RetryOptions) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Thrown>,
{
    let mut attempt = 1u32;
    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => normalize_error(err),
        };

        if attempt >= options.max_attempts || !options.wants_retry(&error) {
            tracing::debug!(attempt, code = %error.code(), "giving up");
            return Err(error);
        }

        options.notify(attempt, &error);
        let wait = options.delay_for_attempt(attempt);
        tracing::debug!(attempt, code = %error.code(), wait_ms = wait.as_millis() as u64, "retrying");
        sleep(wait).await;
        attempt += 1;
    }
}

#[cfg(feature = "tokio")]
async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(all(feature = "async_std", not(feature = "tokio")))]
async fn sleep(duration: Duration) {
    async_std::task::sleep(duration).await;
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::*;
    use crate::factory::{create_error, create_network_error};
    use crate::ErrorCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn zero_attempts_clamps_to_one() {
        assert_eq!(RetryOptions::new().max_attempts(0).attempts(), 1);
    }

    #[test]
    fn backoff_doubles_each_attempt() {
        let opts = RetryOptions::new().delay(Duration::from_millis(100));
        assert_eq!(opts.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(opts.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(opts.delay_for_attempt(4), Duration::from_millis(800));

        let flat = opts.backoff(false);
        assert_eq!(flat.delay_for_attempt(4), Duration::from_millis(100));
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let opts = RetryOptions::new();
        assert_eq!(opts.delay_for_attempt(200), Duration::MAX);
        assert_eq!(opts.delay_for_attempt(33), Duration::MAX);
        assert!(opts.delay_for_attempt(33) >= opts.delay_for_attempt(32));
        assert_eq!(opts.delay_for_attempt(32), Duration::from_secs(1 << 31));
    }

    #[test]
    fn zero_delay_never_grows() {
        let opts = RetryOptions::new().delay(Duration::ZERO);
        assert_eq!(opts.delay_for_attempt(32), Duration::ZERO);
        assert_eq!(opts.delay_for_attempt(200), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = retry_operation(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    match calls.fetch_add(1, Ordering::SeqCst) {
                        0 | 1 => Err(create_network_error(503, None, None, None)),
                        _ => Ok("payload"),
                    }
                }
            },
            RetryOptions::new().delay(Duration::from_millis(10)),
        )
        .await;

        assert_eq!(result.unwrap(), "payload");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed(), Duration::from_millis(30));
    }

    /// Runs an always-failing operation and returns the gaps between calls
    /// along with how often the hook fired.
    async fn call_gaps(options: RetryOptions) -> (Vec<Duration>, u32) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let hooks = Arc::new(AtomicU32::new(0));
        let hook_count = Arc::clone(&hooks);

        let _ = retry_operation(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.lock().unwrap().push(Instant::now());
                    Err::<(), _>(create_network_error(503, None, None, None))
                }
            },
            options.on_retry(move |_, _| {
                hook_count.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await;

        let calls = calls.lock().unwrap();
        let gaps = calls.windows(2).map(|w| w[1] - w[0]).collect();
        (gaps, hooks.load(Ordering::SeqCst))
    }

    #[tokio::test(start_paused = true)]
    async fn waits_double_between_attempts() {
        let (gaps, hooks) = call_gaps(RetryOptions::new().max_attempts(4).delay(Duration::from_millis(10))).await;
        assert_eq!(
            gaps,
            vec![Duration::from_millis(10), Duration::from_millis(20), Duration::from_millis(40)]
        );
        assert_eq!(hooks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_stay_flat_without_backoff() {
        let (gaps, hooks) = call_gaps(
            RetryOptions::new()
                .max_attempts(4)
                .delay(Duration::from_millis(10))
                .backoff(false),
        )
        .await;
        assert_eq!(gaps, vec![Duration::from_millis(10); 3]);
        assert_eq!(hooks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let err = retry_operation(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(create_network_error(403, None, None, None))
                }
            },
            RetryOptions::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_and_reports_each_retry() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let hook_seen = Arc::clone(&seen);

        let err = retry_operation(
            || async { Err::<(), _>(create_error(ErrorCode::TimeoutError, None, None, None)) },
            RetryOptions::new()
                .max_attempts(4)
                .delay(Duration::from_millis(5))
                .on_retry(move |attempt, _| hook_seen.lock().unwrap().push(attempt)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::TimeoutError);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_predicate_overrides_default() {
        let calls = Arc::new(AtomicU32::new(0));
        let _ = retry_operation(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("validation failed")
                }
            },
            RetryOptions::new()
                .delay(Duration::from_millis(1))
                .should_retry(|e| e.code() == ErrorCode::UnknownError),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_hook_does_not_stop_the_loop() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = retry_operation(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(create_error(ErrorCode::NetworkError, None, None, None))
                    } else {
                        Ok(7)
                    }
                }
            },
            RetryOptions::new()
                .delay(Duration::from_millis(1))
                .on_retry(|_, _| panic!("hook exploded")),
        )
        .await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn native_errors_are_normalized() {
        let err = retry_operation(
            || async { Err::<(), _>(std::io::Error::other("boom")) },
            RetryOptions::new().max_attempts(1),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownError);
        assert_eq!(err.message(), "boom");
    }
}
