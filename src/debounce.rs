//! Duplicate-report suppression.
//!
//! A [`DebouncedReporter`] forwards an error to its report function unless an
//! error with the same `(code, message)` was forwarded less than `delay` ago.
//! It never delays or queues anything: a call either reports right now or is
//! dropped.

use crate::ErrorCode;
use crate::models::AppError;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

type ReportFn = dyn Fn(&AppError) + Send + Sync;
type DedupKey = (ErrorCode, String);

/// Suppression filter in front of a report function.
///
/// Cloning yields a handle onto the same state.
#[derive(Clone)]
pub struct DebouncedReporter {
    report_fn: Arc<ReportFn>,
    delay: Duration,
    last_sent: Arc<Mutex<HashMap<DedupKey, Instant>>>,
    suppressed: Arc<AtomicU64>,
}

/// Wrap `report_fn` so identical errors are reported at most once per `delay`.
pub fn debounce_error_reporting(
    report_fn: impl Fn(&AppError) + Send + Sync + 'static,
    delay: Duration,
) -> DebouncedReporter {
    DebouncedReporter::new(report_fn, delay)
}

impl DebouncedReporter {
    /// See [`debounce_error_reporting`].
    pub fn new(report_fn: impl Fn(&AppError) + Send + Sync + 'static, delay: Duration) -> Self {
        Self {
            report_fn: Arc::new(report_fn),
            delay,
            last_sent: Arc::new(Mutex::new(HashMap::new())),
            suppressed: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn state(&self) -> MutexGuard<'_, HashMap<DedupKey, Instant>> {
        match self.last_sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Report `error` unless a duplicate went out within the window.
    /// Returns whether the report function ran.
    pub fn report(&self, error: &AppError) -> bool {
        self.report_at(error, Instant::now())
    }

    pub(crate) fn report_at(&self, error: &AppError, now: Instant) -> bool {
        let key = (error.code(), error.message().to_owned());
        {
            let mut last_sent = self.state();
            let horizon = self.delay.saturating_mul(2);
            last_sent.retain(|_, sent| now.saturating_duration_since(*sent) < horizon);

            if let Some(sent) = last_sent.get(&key) {
                if now.saturating_duration_since(*sent) < self.delay {
                    self.suppressed.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
            }
            last_sent.insert(key, now);
        }

        // Called with the lock released.
        if catch_unwind(AssertUnwindSafe(|| (self.report_fn)(error))).is_err() {
            tracing::debug!(code = %error.code(), "report function panicked");
        }
        true
    }

    /// Suppression window.
    #[inline]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of reports dropped as duplicates since creation.
    #[inline]
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed.load(Ordering::Relaxed)
    }

    /// Number of keys currently remembered.
    pub fn tracked_keys(&self) -> usize {
        self.state().len()
    }
}

impl fmt::Debug for DebouncedReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebouncedReporter")
            .field("delay", &self.delay)
            .field("tracked_keys", &self.tracked_keys())
            .field("suppressed", &self.suppressed_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::create_error;
    use std::sync::atomic::AtomicUsize;

    fn counting(delay: Duration) -> (DebouncedReporter, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let reporter = debounce_error_reporting(
            move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            },
            delay,
        );
        (reporter, count)
    }

    fn err(message: &str) -> AppError {
        create_error(ErrorCode::UnknownError, Some(message.to_owned()), None, None)
    }

    #[test]
    fn duplicates_inside_window_are_dropped() {
        let (reporter, count) = counting(Duration::from_millis(100));
        let t0 = Instant::now();

        assert!(reporter.report_at(&err("x"), t0));
        assert!(!reporter.report_at(&err("x"), t0 + Duration::from_millis(50)));
        assert!(!reporter.report_at(&err("x"), t0 + Duration::from_millis(99)));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.suppressed_count(), 2);
    }

    #[test]
    fn window_is_measured_from_last_sent_report() {
        let (reporter, count) = counting(Duration::from_millis(100));
        let t0 = Instant::now();

        reporter.report_at(&err("x"), t0);
        reporter.report_at(&err("x"), t0 + Duration::from_millis(60));
        assert!(reporter.report_at(&err("x"), t0 + Duration::from_millis(100)));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn duplicate_is_reported_again_once_window_passes() {
        let (reporter, count) = counting(Duration::from_millis(200));

        assert!(reporter.report(&err("x")));
        assert!(!reporter.report(&err("x")));
        std::thread::sleep(Duration::from_millis(250));
        assert!(reporter.report(&err("x")));

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(reporter.suppressed_count(), 1);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let (reporter, count) = counting(Duration::from_secs(5));
        let t0 = Instant::now();

        reporter.report_at(&err("a"), t0);
        reporter.report_at(&err("b"), t0);
        reporter.report_at(
            &create_error(ErrorCode::NetworkError, Some("a".into()), None, None),
            t0,
        );
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn stale_keys_are_pruned() {
        let (reporter, _) = counting(Duration::from_millis(10));
        let t0 = Instant::now();

        reporter.report_at(&err("a"), t0);
        reporter.report_at(&err("b"), t0);
        assert_eq!(reporter.tracked_keys(), 2);

        reporter.report_at(&err("c"), t0 + Duration::from_millis(25));
        assert_eq!(reporter.tracked_keys(), 1);
    }

    #[test]
    fn panicking_report_fn_is_contained() {
        let reporter = debounce_error_reporting(|_| panic!("sink down"), Duration::from_secs(1));
        assert!(reporter.report(&err("x")));
        assert!(!reporter.report(&err("x")));
    }

    #[test]
    fn clones_share_suppression_state() {
        let (reporter, count) = counting(Duration::from_secs(60));
        let other = reporter.clone();

        reporter.report(&err("x"));
        other.report(&err("x"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
