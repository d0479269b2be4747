// benches/error_performance.rs
//! Benchmarks for the hot paths: building, normalizing, classifying and
//! logging errors.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hireline_errors::config::{ErrorKitConfig, RuntimeMode};
use hireline_errors::debounce::debounce_error_reporting;
use hireline_errors::logging::ErrorLogger;
use hireline_errors::ring_buffer::{ErrorHistory, ErrorLogEntry};
use hireline_errors::{
    create_error, create_network_error, create_validation_error, get_error_message, is_retryable_error,
    normalize_error, ErrorCode, ErrorContext,
};
use std::io;
use std::time::Duration;

// ============================================================================
// Construction
// ============================================================================

fn bench_error_constructors(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_constructors");

    group.bench_function("base", |b| {
        b.iter(|| black_box(create_error(ErrorCode::NotFound, None, None, None)));
    });

    group.bench_function("network", |b| {
        b.iter(|| black_box(create_network_error(black_box(503), Some("/api/jobs"), Some("GET"), None)));
    });

    group.bench_function("validation", |b| {
        b.iter(|| {
            black_box(create_validation_error(
                "email",
                "Please enter a valid email address",
                Some("ada@".into()),
                None,
            ))
        });
    });

    group.finish();
}

fn bench_context_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("context");

    for count in [2usize, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("merge", count), &count, |b, &count| {
            b.iter(|| {
                let mut err = create_error(ErrorCode::UnknownError, None, None, None);
                let extra: ErrorContext = (0..count).map(|i| (format!("key{i}"), i as u64)).collect();
                err.merge_context(extra);
                black_box(err)
            });
        });
    }

    group.finish();
}

// ============================================================================
// Normalization and classification
// ============================================================================

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    group.bench_function("app_error_passthrough", |b| {
        let err = create_error(ErrorCode::Forbidden, None, None, None);
        b.iter(|| black_box(normalize_error(err.clone())));
    });

    group.bench_function("io_error_heuristics", |b| {
        b.iter(|| black_box(normalize_error(io::Error::other("fetch failed: connection reset"))));
    });

    group.bench_function("plain_message", |b| {
        b.iter(|| black_box(normalize_error("something odd happened")));
    });

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let err = create_network_error(429, Some("/api/apply"), Some("POST"), None);

    c.bench_function("is_retryable_error", |b| b.iter(|| black_box(is_retryable_error(black_box(&err)))));
    c.bench_function("get_error_message", |b| b.iter(|| black_box(get_error_message(black_box(&err)))));
}

// ============================================================================
// Logging
// ============================================================================

fn bench_history_push(c: &mut Criterion) {
    let history = ErrorHistory::new(1000);
    let err = create_error(ErrorCode::DatabaseError, None, None, None);

    c.bench_function("history_push_at_capacity", |b| {
        b.iter(|| history.push(ErrorLogEntry::new(err.clone(), "Server", "Server")));
    });
}

fn bench_debounce(c: &mut Criterion) {
    let reporter = debounce_error_reporting(|e| { black_box(e.code()); }, Duration::from_secs(60));
    let err = create_error(ErrorCode::NetworkError, None, None, None);
    reporter.report(&err);

    c.bench_function("debounce_suppressed_report", |b| b.iter(|| black_box(reporter.report(&err))));
}

fn bench_logger(c: &mut Criterion) {
    let logger = ErrorLogger::new(ErrorKitConfig::default().with_mode(RuntimeMode::Production));
    let err = create_error(ErrorCode::NotFound, None, None, None);

    c.bench_function("logger_log_production", |b| {
        b.iter(|| black_box(logger.log(&err, Some(ErrorContext::new().with("component", "Bench")))));
    });
}

criterion_group!(
    benches,
    bench_error_constructors,
    bench_context_merge,
    bench_normalize,
    bench_classification,
    bench_history_push,
    bench_debounce,
    bench_logger,
);
criterion_main!(benches);
