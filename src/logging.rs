//! Error logging and production reporting.
//!
//! [`ErrorLogger`] is the one object callers hand errors to. Every call:
//!
//! 1. stores an [`ErrorLogEntry`] in the bounded [`ErrorHistory`],
//! 2. in development, emits a grouped `tracing` span with the error details,
//! 3. for critical errors, always emits a `tracing::error!` line,
//! 4. in production, sends a debounced JSON report through a [`ReportSink`].
//!
//! Breadcrumbs (user actions, navigation, performance marks, feature usage)
//! accumulate in the [`ErrorReporter`] and ride along with every report.
//!
//! # What Never Gets Logged
//!
//! The causing error (`original_error`) is never serialized or formatted
//! here; reports only say whether one was present. User info is zeroized on
//! drop.
//!
//! ```rust
//! use hireline_errors::config::{ErrorKitConfig, RuntimeMode};
//! use hireline_errors::logging::ErrorLogger;
//! use hireline_errors::{create_error, ErrorCode};
//!
//! let logger = ErrorLogger::new(ErrorKitConfig::default().with_mode(RuntimeMode::Development));
//! let id = logger.log(&create_error(ErrorCode::QueryFailed, None, None, None), None);
//! assert!(logger.get_error_by_id(&id).is_some());
//! ```

use crate::classify::{generate_error_id, is_critical_error};
use crate::config::{Environment, ErrorKitConfig, RuntimeMode};
use crate::debounce::DebouncedReporter;
use crate::models::{AppError, ErrorInfo};
use crate::ring_buffer::{ErrorHistory, ErrorLogEntry};
use crate::{ErrorContext, Severity};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Sinks
// ============================================================================

/// Error returned by a failing [`ReportSink`].
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Destination for production reports. Receives one JSON document per call.
pub trait ReportSink: Send + Sync {
    /// Deliver one serialized report.
    fn send(&self, report: &str) -> Result<(), SinkError>;
}

/// Writes reports as `tracing` events on the `error_report` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReportSink;

impl ReportSink for TracingReportSink {
    fn send(&self, report: &str) -> Result<(), SinkError> {
        tracing::error!(target: "error_report", "ERROR_REPORT: {report}");
        Ok(())
    }
}

// ============================================================================
// Reporter
// ============================================================================

/// The signed-in user, attached to reports and log entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// User id.
    pub id: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Current session id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl UserInfo {
    /// User with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
            session_id: None,
        }
    }

    /// Builder: set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builder: set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the session id.
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

/// What a breadcrumb records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreadcrumbCategory {
    /// Something the user did.
    User,
    /// Route change.
    Navigation,
    /// Timing measurement.
    Performance,
    /// Feature usage.
    Feature,
}

/// One step in the trail leading up to an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breadcrumb {
    /// Description.
    pub message: String,
    /// When it happened, ms since epoch.
    pub timestamp: u64,
    /// Kind of step.
    pub category: BreadcrumbCategory,
    /// Extra details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Default)]
struct ReporterState {
    user: Option<UserInfo>,
    breadcrumbs: VecDeque<Breadcrumb>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorReport<'a> {
    error_id: String,
    timestamp: u64,
    error: ErrorInfo<'a>,
    has_original_error: bool,
    user: Option<&'a UserInfo>,
    breadcrumbs: &'a VecDeque<Breadcrumb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a ErrorContext>,
    severity: Severity,
    url: &'a str,
    user_agent: &'a str,
}

/// Builds structured reports and hands them to a [`ReportSink`].
///
/// Cloning yields a handle onto the same user and breadcrumb trail.
#[derive(Clone)]
pub struct ErrorReporter {
    state: Arc<Mutex<ReporterState>>,
    max_breadcrumbs: usize,
    sink: Arc<dyn ReportSink>,
    environment: Arc<Environment>,
}

impl ErrorReporter {
    /// Reporter keeping at most `max_breadcrumbs` trail entries.
    pub fn new(sink: Arc<dyn ReportSink>, max_breadcrumbs: usize, environment: Environment) -> Self {
        Self {
            state: Arc::new(Mutex::new(ReporterState::default())),
            max_breadcrumbs,
            sink,
            environment: Arc::new(environment),
        }
    }

    #[inline]
    fn state(&self) -> MutexGuard<'_, ReporterState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Attach a user to subsequent reports.
    pub fn set_user(&self, user: UserInfo) {
        self.state().user = Some(user);
    }

    /// Forget the current user.
    pub fn clear_user(&self) {
        self.state().user = None;
    }

    /// Current user, if any.
    pub fn user(&self) -> Option<UserInfo> {
        self.state().user.clone()
    }

    /// Append to the trail, dropping the oldest entry past the cap.
    pub fn add_breadcrumb(
        &self,
        message: impl Into<String>,
        category: BreadcrumbCategory,
        data: Option<serde_json::Value>,
    ) {
        let crumb = Breadcrumb {
            message: message.into(),
            timestamp: crate::models::unix_millis(),
            category,
            data,
        };
        let mut state = self.state();
        state.breadcrumbs.push_back(crumb);
        while state.breadcrumbs.len() > self.max_breadcrumbs {
            state.breadcrumbs.pop_front();
        }
    }

    /// Snapshot of the trail, oldest first.
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.state().breadcrumbs.iter().cloned().collect()
    }

    /// Serialize and send one report. Sink failures are swallowed.
    pub fn report(&self, error: &AppError, context: Option<&ErrorContext>) {
        let line = {
            let state = self.state();
            let report = ErrorReport {
                error_id: generate_error_id(),
                timestamp: crate::models::unix_millis(),
                error: error.info(),
                has_original_error: error.original_error().is_some(),
                user: state.user.as_ref(),
                breadcrumbs: &state.breadcrumbs,
                context,
                severity: error.severity(),
                url: &self.environment.url,
                user_agent: &self.environment.user_agent,
            };
            match serde_json::to_string(&report) {
                Ok(line) => line,
                Err(e) => {
                    tracing::debug!(error = %e, "failed to serialize error report");
                    return;
                }
            }
        };

        if let Err(e) = self.sink.send(&line) {
            tracing::debug!(error = %e, code = %error.code(), "report sink rejected error report");
        }
    }
}

impl fmt::Debug for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ErrorReporter")
            .field("user", &state.user.as_ref().map(|u| u.id.as_str()))
            .field("breadcrumbs", &state.breadcrumbs.len())
            .field("max_breadcrumbs", &self.max_breadcrumbs)
            .finish()
    }
}

// ============================================================================
// Logger
// ============================================================================

struct LoggerInner {
    config: ErrorKitConfig,
    history: ErrorHistory,
    reporter: ErrorReporter,
    debounced: DebouncedReporter,
}

/// Facade combining history, development output and production reports.
///
/// Cheap to clone; clones share everything.
#[derive(Clone)]
pub struct ErrorLogger {
    inner: Arc<LoggerInner>,
}

impl ErrorLogger {
    /// Logger reporting through [`TracingReportSink`].
    pub fn new(config: ErrorKitConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingReportSink))
    }

    /// Logger reporting through `sink`.
    pub fn with_sink(config: ErrorKitConfig, sink: Arc<dyn ReportSink>) -> Self {
        let reporter = ErrorReporter::new(sink, config.max_breadcrumbs, config.environment.clone());
        let report_handle = reporter.clone();
        let debounced =
            DebouncedReporter::new(move |error| report_handle.report(error, None), config.report_debounce());

        Self {
            inner: Arc::new(LoggerInner {
                history: ErrorHistory::new(config.max_logs),
                config,
                reporter,
                debounced,
            }),
        }
    }

    /// Active mode.
    #[inline]
    pub fn mode(&self) -> RuntimeMode {
        self.inner.config.mode
    }

    /// Active configuration.
    #[inline]
    pub fn config(&self) -> &ErrorKitConfig {
        &self.inner.config
    }

    /// Underlying history.
    #[inline]
    pub fn history(&self) -> &ErrorHistory {
        &self.inner.history
    }

    /// Underlying reporter.
    #[inline]
    pub fn reporter(&self) -> &ErrorReporter {
        &self.inner.reporter
    }

    /// Log an error and return its tracking id.
    pub fn log(&self, error: &AppError, context: Option<ErrorContext>) -> Arc<str> {
        let env = &self.inner.config.environment;
        let user = self.inner.reporter.user();
        let entry = ErrorLogEntry::new(error.clone(), &env.user_agent, &env.url)
            .with_user(
                user.as_ref().map(|u| u.id.as_str()),
                user.as_ref().and_then(|u| u.session_id.as_deref()),
            )
            .with_context(context.unwrap_or_default());
        let id = Arc::clone(&entry.id);

        if self.mode() == RuntimeMode::Development {
            emit_grouped(&entry);
        }

        if is_critical_error(error) {
            tracing::error!(
                id = %id,
                code = %error.code(),
                severity = %error.severity(),
                detail = error.message(),
                "CRITICAL ERROR"
            );
        }

        if self.mode().is_production() {
            self.inner.debounced.report(error);
        }

        self.inner.history.push(entry);
        id
    }

    /// Record a user action breadcrumb.
    pub fn log_user_action(&self, action: &str, details: Option<serde_json::Value>) {
        if self.mode() == RuntimeMode::Development {
            tracing::info!(action, details = ?details, "user action");
        }
        self.inner
            .reporter
            .add_breadcrumb(action, BreadcrumbCategory::User, details);
    }

    /// Record a route change breadcrumb.
    pub fn log_navigation(&self, from: &str, to: &str) {
        let message = format!("Navigation: {from} → {to}");
        if self.mode() == RuntimeMode::Development {
            tracing::info!(from, to, "navigation");
        }
        self.inner
            .reporter
            .add_breadcrumb(message, BreadcrumbCategory::Navigation, None);
    }

    /// Record a timing breadcrumb such as `"ttfb: 120ms"`.
    pub fn log_performance(&self, metric: &str, value: f64, unit: Option<&str>) {
        let unit = unit.unwrap_or("");
        if self.mode() == RuntimeMode::Development {
            tracing::info!(metric, value, unit, "performance");
        }
        self.inner.reporter.add_breadcrumb(
            format!("{metric}: {value}{unit}"),
            BreadcrumbCategory::Performance,
            None,
        );
    }

    /// Record a feature usage breadcrumb.
    pub fn log_feature_usage(&self, feature: &str, details: Option<serde_json::Value>) {
        if self.mode() == RuntimeMode::Development {
            tracing::info!(feature, details = ?details, "feature used");
        }
        self.inner.reporter.add_breadcrumb(
            format!("Feature: {feature}"),
            BreadcrumbCategory::Feature,
            details,
        );
    }

    /// Attach a user to subsequent entries and reports.
    pub fn set_user(&self, user: UserInfo) {
        self.inner.reporter.set_user(user);
    }

    /// Forget the current user.
    pub fn clear_user(&self) {
        self.inner.reporter.clear_user();
    }

    /// Logged entries, newest first.
    pub fn logs(&self) -> Vec<ErrorLogEntry> {
        self.inner.history.get_all()
    }

    /// Drop every logged entry.
    pub fn clear_logs(&self) {
        self.inner.history.clear();
    }

    /// Look up an entry by tracking id.
    pub fn get_error_by_id(&self, id: &str) -> Option<ErrorLogEntry> {
        self.inner.history.get_by_id(id)
    }

    /// Flag an entry as resolved. Unknown ids are ignored.
    pub fn mark_resolved(&self, id: &str) -> bool {
        self.inner.history.mark_resolved(id)
    }
}

impl fmt::Debug for ErrorLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorLogger")
            .field("mode", &self.mode())
            .field("history", &self.inner.history)
            .field("reporter", &self.inner.reporter)
            .finish()
    }
}

fn emit_grouped(entry: &ErrorLogEntry) {
    let span = tracing::error_span!("logged_error", id = %entry.id, code = %entry.error.code());
    let _group = span.enter();

    match serde_json::to_string(&entry.error.info()) {
        Ok(details) => tracing::error!(%details, "error details"),
        Err(e) => tracing::debug!(error = %e, "failed to serialize error details"),
    }
    if entry.error.original_error().is_some() {
        tracing::error!("original error attached");
    }
    tracing::info!(context = ?entry.context, "context");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{create_error, create_validation_error};
    use crate::ErrorCode;

    #[derive(Default)]
    struct CapturingSink {
        lines: Mutex<Vec<String>>,
    }

    impl ReportSink for CapturingSink {
        fn send(&self, report: &str) -> Result<(), SinkError> {
            self.lines.lock().unwrap().push(report.to_owned());
            Ok(())
        }
    }

    struct FailingSink;

    impl ReportSink for FailingSink {
        fn send(&self, _: &str) -> Result<(), SinkError> {
            Err("collector unreachable".into())
        }
    }

    fn production() -> (ErrorLogger, Arc<CapturingSink>) {
        let sink = Arc::new(CapturingSink::default());
        let logger = ErrorLogger::with_sink(
            ErrorKitConfig::default().with_mode(RuntimeMode::Production),
            sink.clone(),
        );
        (logger, sink)
    }

    #[test]
    fn production_reports_are_debounced() {
        let (logger, sink) = production();
        let err = create_error(ErrorCode::QueryFailed, None, None, None);

        logger.log(&err, None);
        logger.log(&err, None);
        logger.log(&create_error(ErrorCode::UploadFailed, None, None, None), None);

        assert_eq!(sink.lines.lock().unwrap().len(), 2);
        assert_eq!(logger.logs().len(), 3);
    }

    #[test]
    fn development_mode_sends_no_reports() {
        let sink = Arc::new(CapturingSink::default());
        let logger = ErrorLogger::with_sink(
            ErrorKitConfig::default().with_mode(RuntimeMode::Development),
            sink.clone(),
        );
        logger.log(&create_error(ErrorCode::DatabaseError, None, None, None), None);
        assert!(sink.lines.lock().unwrap().is_empty());
        assert_eq!(logger.logs().len(), 1);
    }

    #[test]
    fn report_carries_user_and_breadcrumbs_but_not_original() {
        let (logger, sink) = production();
        logger.set_user(UserInfo::new("user_1").with_email("ada@example.com"));
        logger.log_navigation("/jobs", "/jobs/42");
        logger.log_user_action("apply_clicked", Some(serde_json::json!({"jobId": 42})));

        let err = create_error(
            ErrorCode::MutationFailed,
            None,
            None,
            Some(Arc::new(std::io::Error::other("api_key=XYZ"))),
        );
        logger.log(&err, None);

        let lines = sink.lines.lock().unwrap();
        let report: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(report["user"]["id"], "user_1");
        assert_eq!(report["breadcrumbs"].as_array().unwrap().len(), 2);
        assert_eq!(report["breadcrumbs"][0]["category"], "navigation");
        assert_eq!(report["error"]["code"], "MUTATION_FAILED");
        assert_eq!(report["hasOriginalError"], true);
        assert!(!lines[0].contains("api_key"));
    }

    #[test]
    fn entries_pick_up_current_user() {
        let (logger, _) = production();
        logger.set_user(UserInfo::new("user_7").with_session("sess_9"));
        let id = logger.log(&create_validation_error("email", "bad", None, None), None);
        let entry = logger.get_error_by_id(&id).unwrap();
        assert_eq!(entry.user_id.as_deref(), Some("user_7"));
        assert_eq!(entry.session_id.as_deref(), Some("sess_9"));

        logger.clear_user();
        let id = logger.log(&create_validation_error("email", "bad", None, None), None);
        assert!(logger.get_error_by_id(&id).unwrap().user_id.is_none());
    }

    #[test]
    fn breadcrumb_trail_is_capped() {
        let (logger, _) = production();
        for i in 0..60 {
            logger.log_feature_usage(&format!("f{i}"), None);
        }
        let crumbs = logger.reporter().breadcrumbs();
        assert_eq!(crumbs.len(), 50);
        assert_eq!(crumbs[0].message, "Feature: f10");
    }

    #[test]
    fn performance_breadcrumb_format() {
        let (logger, _) = production();
        logger.log_performance("ttfb", 120.0, Some("ms"));
        assert_eq!(logger.reporter().breadcrumbs()[0].message, "ttfb: 120ms");
    }

    #[test]
    fn failing_sink_is_swallowed() {
        let logger = ErrorLogger::with_sink(
            ErrorKitConfig::default().with_mode(RuntimeMode::Production),
            Arc::new(FailingSink),
        );
        logger.log(&create_error(ErrorCode::InternalServerError, None, None, None), None);
        assert_eq!(logger.logs().len(), 1);
    }

    #[test]
    fn resolve_and_clear() {
        let (logger, _) = production();
        let ctx = ErrorContext::new().with("component", "ProfileForm");
        let id = logger.log(&create_error(ErrorCode::NotFound, None, None, None), Some(ctx));

        assert!(logger.mark_resolved(&id));
        let entry = logger.get_error_by_id(&id).unwrap();
        assert!(entry.resolved);
        assert_eq!(entry.context.get("component"), Some("ProfileForm"));

        logger.clear_logs();
        assert!(logger.logs().is_empty());
        assert!(!logger.mark_resolved(&id));
    }

    #[test]
    fn history_capacity_follows_config() {
        let config = ErrorKitConfig {
            max_logs: 2,
            ..ErrorKitConfig::default().with_mode(RuntimeMode::Production)
        };
        let logger = ErrorLogger::with_sink(config, Arc::new(CapturingSink::default()));
        for i in 0..3 {
            logger.log(&create_error(ErrorCode::UnknownError, Some(format!("e{i}")), None, None), None);
        }
        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].error.message(), "e2");
    }
}
