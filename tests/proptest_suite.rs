//! Property-based tests for hireline_errors
//!
//! These tests use proptest to generate random inputs and verify invariants hold.

use hireline_errors::debounce::debounce_error_reporting;
use hireline_errors::definitions::{code_for_status, is_retryable_status, RETRYABLE_STATUSES};
use hireline_errors::ring_buffer::{ErrorHistory, ErrorLogEntry};
use hireline_errors::{
    create_error, create_network_error, is_retryable_error, normalize_error, ErrorCode, ErrorContext,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn any_code() -> impl Strategy<Value = ErrorCode> {
    prop::sample::select(ErrorCode::ALL.to_vec())
}

// ============================================================================
// STATUS MAPPING PROPERTIES
// ============================================================================

proptest! {
    /// Unmapped statuses always fall back to NETWORK_ERROR
    #[test]
    fn unmapped_statuses_are_network_errors(status in any::<u16>()) {
        let mapped = [400u16, 401, 403, 404, 408, 429, 500, 502, 503, 504];
        prop_assume!(!mapped.contains(&status));
        prop_assert_eq!(code_for_status(status), ErrorCode::NetworkError);
    }

    /// A network error is retryable exactly when its status is in the retryable set
    #[test]
    fn network_retryability_follows_status(status in any::<u16>()) {
        let err = create_network_error(status, None, None, None);
        prop_assert_eq!(is_retryable_error(&err), RETRYABLE_STATUSES.contains(&status));
        prop_assert_eq!(is_retryable_status(status), RETRYABLE_STATUSES.contains(&status));
        prop_assert_eq!(err.code(), code_for_status(status));
    }
}

// ============================================================================
// NORMALIZATION PROPERTIES
// ============================================================================

proptest! {
    /// Normalizing an AppError twice changes nothing
    #[test]
    fn normalization_is_idempotent(code in any_code(), message in "\\PC{0,80}") {
        let err = create_error(code, Some(message), None, None);
        let once = normalize_error(err.clone());
        let twice = normalize_error(once.clone());

        prop_assert_eq!(once.code(), err.code());
        prop_assert_eq!(twice.code(), once.code());
        prop_assert_eq!(twice.message(), once.message());
        prop_assert_eq!(twice.timestamp(), err.timestamp());
    }

    /// Plain messages keep their text
    #[test]
    fn plain_messages_become_unknown_errors(message in "\\PC{1,80}") {
        let err = normalize_error(message.clone());
        prop_assert_eq!(err.code(), ErrorCode::UnknownError);
        prop_assert_eq!(err.message(), message.as_str());
    }

    /// Codes survive a trip through their wire name
    #[test]
    fn code_names_parse_back(code in any_code()) {
        let parsed: ErrorCode = code.as_str().parse().unwrap();
        prop_assert_eq!(parsed, code);
    }
}

// ============================================================================
// CONTEXT PROPERTIES
// ============================================================================

proptest! {
    /// Merging keeps every key and lets the incoming side win
    #[test]
    fn merge_prefers_incoming_values(
        left in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,8}", 0..8),
        right in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,8}", 0..8),
    ) {
        let mut merged: ErrorContext = left.clone().into_iter().collect();
        merged.merge(right.clone().into_iter().collect());

        for (key, value) in &right {
            prop_assert_eq!(merged.get(key), Some(value.as_str()));
        }
        for (key, value) in left.iter().filter(|(k, _)| !right.contains_key(*k)) {
            prop_assert_eq!(merged.get(key), Some(value.as_str()));
        }
        let distinct = left.keys().chain(right.keys()).collect::<std::collections::BTreeSet<_>>();
        prop_assert_eq!(merged.len(), distinct.len());
    }
}

// ============================================================================
// HISTORY PROPERTIES
// ============================================================================

proptest! {
    /// History never grows beyond capacity and keeps the newest entries
    #[test]
    fn history_respects_capacity(capacity in 1usize..50, pushes in 0usize..200) {
        let history = ErrorHistory::new(capacity);
        let mut last_id = None;
        for _ in 0..pushes {
            let entry = ErrorLogEntry::new(create_error(ErrorCode::UnknownError, None, None, None), "Server", "Server");
            last_id = Some(entry.id.clone());
            history.push(entry);
        }

        prop_assert_eq!(history.len(), pushes.min(capacity));
        prop_assert_eq!(history.eviction_count(), pushes.saturating_sub(capacity) as u64);
        if let Some(id) = last_id {
            let newest = history.get_recent(1);
            prop_assert_eq!(&newest[0].id, &id);
        }
    }

    /// Long environment strings are cut to a bounded, valid prefix
    #[test]
    fn entry_environment_is_bounded(agent in "\\PC{0,2000}") {
        let entry = ErrorLogEntry::new(create_error(ErrorCode::UnknownError, None, None, None), &agent, "Server");
        prop_assert!(entry.user_agent.len() <= hireline_errors::ring_buffer::MAX_ENVIRONMENT_BYTES);
        prop_assert!(std::str::from_utf8(entry.user_agent.as_bytes()).is_ok());
    }
}

// ============================================================================
// DEBOUNCE PROPERTIES
// ============================================================================

proptest! {
    /// Bursts of one error inside the window report exactly once
    #[test]
    fn bursts_report_once(burst in 1usize..40, code in any_code()) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reporter = debounce_error_reporting(
            move |_| { counter.fetch_add(1, Ordering::SeqCst); },
            Duration::from_secs(60),
        );

        let err = create_error(code, Some("same message".into()), None, None);
        for _ in 0..burst {
            reporter.report(&err);
        }

        prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
        prop_assert_eq!(reporter.suppressed_count(), (burst - 1) as u64);
    }

    /// Distinct messages are tracked independently
    #[test]
    fn distinct_messages_all_report(count in 1usize..20) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reporter = debounce_error_reporting(
            move |_| { counter.fetch_add(1, Ordering::SeqCst); },
            Duration::from_secs(60),
        );

        for i in 0..count {
            reporter.report(&create_error(ErrorCode::NetworkError, Some(format!("failure {i}")), None, None));
        }
        prop_assert_eq!(calls.load(Ordering::SeqCst), count);
    }
}

// ============================================================================
// RETRY PROPERTIES
// ============================================================================

#[cfg(feature = "tokio")]
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A permanently failing retryable operation runs exactly max_attempts times
    #[test]
    fn retry_runs_max_attempts(attempts in 1u32..6) {
        use hireline_errors::retry::{retry_operation, RetryOptions};

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let result = runtime.block_on(retry_operation(
            || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(create_error(ErrorCode::ServiceUnavailable, None, None, None))
                }
            },
            RetryOptions::new().max_attempts(attempts).delay(Duration::from_millis(5)),
        ));

        prop_assert!(result.is_err());
        prop_assert_eq!(calls.load(Ordering::SeqCst), attempts as usize);
    }
}
