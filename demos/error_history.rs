//! Error log, breadcrumbs and debounced production reports.

use hireline_errors::config::{Environment, ErrorKitConfig, RuntimeMode};
use hireline_errors::logging::{ErrorLogger, ReportSink, SinkError, UserInfo};
use hireline_errors::{create_database_error, create_network_error, DbOperation, ErrorCode, ErrorContext};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Prints reports instead of shipping them.
struct StdoutSink;

impl ReportSink for StdoutSink {
    fn send(&self, report: &str) -> Result<(), SinkError> {
        println!("   REPORT {report}");
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("--- Error History Example ---\n");

    let config = ErrorKitConfig::default()
        .with_mode(RuntimeMode::Production)
        .with_environment(Environment {
            user_agent: "demo/1.0".into(),
            url: "https://app.example.com/jobs".into(),
        });
    let logger = ErrorLogger::with_sink(config, Arc::new(StdoutSink));
    logger.set_user(UserInfo::new("user_42").with_email("ada@example.com"));

    // 1. Breadcrumbs trail the user's steps up to the failure.
    logger.log_navigation("/jobs", "/jobs/7");
    logger.log_feature_usage("quick_apply", None);
    logger.log_performance("apply_latency", 812.0, Some("ms"));

    // 2. Identical errors inside the debounce window are reported once.
    println!("1. [REPORTS]");
    let timeout = create_network_error(504, Some("/api/apply"), Some("POST"), None);
    let first_id = logger.log(&timeout, Some(ErrorContext::new().with("component", "ApplyButton")));
    logger.log(&timeout, None);
    logger.log(&create_database_error(DbOperation::Mutation, None, None), None);

    // 3. Every error stays in the history regardless of reporting.
    println!("\n2. [HISTORY] newest first");
    for entry in logger.logs() {
        println!(
            "   {} {:<22} user={} resolved={}",
            entry.id,
            entry.error.code().as_str(),
            entry.user_id.as_deref().unwrap_or("-"),
            entry.resolved
        );
    }

    logger.mark_resolved(&first_id);
    let open = logger
        .history()
        .get_filtered(|e| !e.resolved && e.error.code() == ErrorCode::TimeoutError);
    println!("\n3. [FILTER] open timeouts: {}", open.len());

    logger.clear_logs();
    println!("4. [CLEAR] entries left: {}", logger.logs().len());
}
