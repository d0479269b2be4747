//! Toast presentation.
//!
//! The [`Notifier`] turns errors into [`Toast`] values and hands them to an
//! external [`ToastSink`]. It holds nothing but the sink handle. Durations and
//! positions per toast flavour:
//!
//! | method                           | duration | position      |
//! |----------------------------------|----------|---------------|
//! | `show_error_toast`               | 5 s      | bottom-right  |
//! | `show_retry_toast`               | 10 s     | bottom-right  |
//! | `show_auth_error_toast`          | 8 s      | top-center    |
//! | `show_network_error_toast`       | 10 s     | bottom-right  |
//! | `show_rate_limit_toast`          | 30 s or `retry_after` | top-center |
//! | `show_validation_error_toast`    | 6 s      | sink default  |
//! | `show_file_upload_error_toast`   | 6 s      | sink default  |
//! | `show_success_toast`             | 3 s      | sink default  |
//! | `show_info_toast`, `show_warning_toast` | 4 s | sink default |
//!
//! Actions do not touch any UI themselves. [`ToastAction::activate`] reports
//! an [`ActionOutcome`] and the host application performs the reload or
//! navigation.

use crate::classify::{get_error_message, is_retryable_error, normalize_error};
use crate::models::{AppError, Thrown};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Identifier the sink assigns to a shown toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToastId(pub u64);

/// Visual flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    /// Green.
    Success,
    /// Red.
    Error,
    /// Amber.
    Warning,
    /// Neutral.
    Info,
    /// Spinner, stays until updated.
    Loading,
}

/// Screen anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastPosition {
    /// Top left.
    TopLeft,
    /// Top center.
    TopCenter,
    /// Top right.
    TopRight,
    /// Bottom left.
    BottomLeft,
    /// Bottom center.
    BottomCenter,
    /// Bottom right.
    BottomRight,
}

/// Boxed retry future.
pub type RetryFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send>>;

/// Async retry callback whose failures are already normalized.
pub type RetryFn = Arc<dyn Fn() -> RetryFuture + Send + Sync>;

/// Plain callback.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// What activating an action does.
#[derive(Clone)]
pub enum ActionHandler {
    /// Ask the host to reload the current page.
    Reload,
    /// Close the toast.
    Dismiss,
    /// Run a caller-supplied callback.
    Callback(Callback),
    /// Run an async retry, then show a follow-up success toast.
    Retry {
        /// The retry itself.
        run: RetryFn,
        /// Follow-up title and description on success.
        success: (String, String),
        /// Where the follow-up goes.
        sink: Arc<dyn ToastSink>,
    },
    /// Surface a list of detail lines.
    Details(Vec<String>),
}

/// Result of activating an action.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Host should reload.
    Reload,
    /// Toast closed.
    Dismissed,
    /// Callback ran.
    CallbackRan,
    /// Retry succeeded; the follow-up toast has this id.
    RetrySucceeded(ToastId),
    /// Retry failed. Logged, never propagated further.
    RetryFailed(AppError),
    /// Detail lines to show.
    Details(Vec<String>),
}

/// The single primary action on a toast.
#[derive(Clone)]
pub struct ToastAction {
    /// Button label.
    pub label: String,
    /// Behaviour.
    pub handler: ActionHandler,
}

impl ToastAction {
    /// Action with the given label and handler.
    pub fn new(label: impl Into<String>, handler: ActionHandler) -> Self {
        Self {
            label: label.into(),
            handler,
        }
    }

    /// Action running `callback`.
    pub fn callback(label: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self::new(label, ActionHandler::Callback(Arc::new(callback)))
    }

    /// Perform the action.
    pub async fn activate(&self) -> ActionOutcome {
        match &self.handler {
            ActionHandler::Reload => ActionOutcome::Reload,
            ActionHandler::Dismiss => ActionOutcome::Dismissed,
            ActionHandler::Callback(cb) => {
                cb();
                ActionOutcome::CallbackRan
            }
            ActionHandler::Retry { run, success, sink } => match run().await {
                Ok(()) => {
                    let (title, description) = success;
                    let toast = Toast::new(ToastKind::Success, title.clone())
                        .description(description.clone())
                        .duration(SUCCESS_DURATION);
                    ActionOutcome::RetrySucceeded(sink.show(toast))
                }
                Err(error) => {
                    tracing::warn!(code = %error.code(), detail = error.message(), "retry failed");
                    ActionOutcome::RetryFailed(error)
                }
            },
            ActionHandler::Details(lines) => {
                tracing::info!(count = lines.len(), "validation errors: {lines:?}");
                ActionOutcome::Details(lines.clone())
            }
        }
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler = match &self.handler {
            ActionHandler::Reload => "reload",
            ActionHandler::Dismiss => "dismiss",
            ActionHandler::Callback(_) => "callback",
            ActionHandler::Retry { .. } => "retry",
            ActionHandler::Details(_) => "details",
        };
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .field("handler", &handler)
            .finish()
    }
}

/// One notification as handed to the sink.
#[derive(Debug, Clone)]
pub struct Toast {
    /// Flavour.
    pub kind: ToastKind,
    /// Heading.
    pub title: String,
    /// Body.
    pub description: Option<String>,
    /// Auto-close delay; `None` keeps the sink default.
    pub duration: Option<Duration>,
    /// Primary action.
    pub action: Option<ToastAction>,
    /// Anchor; `None` keeps the sink default.
    pub position: Option<ToastPosition>,
    /// Whether the user may close it.
    pub dismissible: bool,
    /// Existing toast to replace.
    pub id: Option<ToastId>,
}

impl Toast {
    /// Bare toast.
    pub fn new(kind: ToastKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            duration: None,
            action: None,
            position: None,
            dismissible: true,
            id: None,
        }
    }

    #[must_use]
    fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    fn position(mut self, position: ToastPosition) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    fn action(mut self, action: Option<ToastAction>) -> Self {
        self.action = action;
        self
    }
}

/// External toast display.
pub trait ToastSink: Send + Sync {
    /// Show `toast`, replacing the toast with `toast.id` if set.
    fn show(&self, toast: Toast) -> ToastId;
    /// Close one toast, or every toast when `id` is `None`.
    fn dismiss(&self, id: Option<ToastId>);
}

/// Overrides for the error toast helpers.
#[derive(Debug, Clone, Default)]
pub struct ToastOptions {
    /// Replace the default duration.
    pub duration: Option<Duration>,
    /// Replace the default action.
    pub action: Option<ToastAction>,
    /// `Some(false)` makes the toast sticky.
    pub dismissible: Option<bool>,
    /// Replace the default position.
    pub position: Option<ToastPosition>,
}

const ERROR_DURATION: Duration = Duration::from_millis(5_000);
const RETRY_DURATION: Duration = Duration::from_millis(10_000);
const AUTH_DURATION: Duration = Duration::from_millis(8_000);
const RATE_LIMIT_DURATION: Duration = Duration::from_millis(30_000);
const FORM_DURATION: Duration = Duration::from_millis(6_000);
const SUCCESS_DURATION: Duration = Duration::from_millis(3_000);
const NOTICE_DURATION: Duration = Duration::from_millis(4_000);

/// Box an async retry callback into a [`RetryFn`].
pub fn retry_fn<F, Fut, E>(on_retry: F) -> RetryFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<Thrown> + 'static,
{
    Arc::new(move || -> RetryFuture {
        let fut = on_retry();
        Box::pin(async move { fut.await.map_err(normalize_error) })
    })
}

/// Presentation dispatcher over a [`ToastSink`].
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn ToastSink>,
}

impl Notifier {
    /// Notifier writing to `sink`.
    pub fn new(sink: Arc<dyn ToastSink>) -> Self {
        Self { sink }
    }

    fn error_toast(&self, error: &AppError) -> Toast {
        let msg = get_error_message(error);
        Toast::new(ToastKind::Error, msg.title).description(msg.message)
    }

    fn retry_action(&self, label: &str, run: RetryFn, title: &str, description: &str) -> ToastAction {
        ToastAction::new(
            label,
            ActionHandler::Retry {
                run,
                success: (title.to_owned(), description.to_owned()),
                sink: Arc::clone(&self.sink),
            },
        )
    }

    /// Standard error toast. The default action reloads for retryable errors
    /// and dismisses otherwise.
    pub fn show_error_toast(&self, error: &AppError, options: Option<ToastOptions>) -> ToastId {
        let options = options.unwrap_or_default();
        let label = get_error_message(error).action;
        let action = options.action.unwrap_or_else(|| {
            let handler = if is_retryable_error(error) {
                ActionHandler::Reload
            } else {
                ActionHandler::Dismiss
            };
            ToastAction::new(label, handler)
        });

        let mut toast = self
            .error_toast(error)
            .duration(options.duration.unwrap_or(ERROR_DURATION))
            .position(options.position.unwrap_or(ToastPosition::BottomRight))
            .action(Some(action));
        toast.dismissible = options.dismissible != Some(false);
        self.sink.show(toast)
    }

    /// Error toast with a "Retry" button running `on_retry`.
    pub fn show_retry_toast<F, Fut, E>(
        &self,
        error: &AppError,
        on_retry: F,
        options: Option<ToastOptions>,
    ) -> ToastId
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<Thrown> + 'static,
    {
        let options = options.unwrap_or_default();
        let action = self.retry_action(
            "Retry",
            retry_fn(on_retry),
            "Success",
            "The operation completed successfully.",
        );
        let mut toast = self
            .error_toast(error)
            .duration(options.duration.unwrap_or(RETRY_DURATION))
            .position(options.position.unwrap_or(ToastPosition::BottomRight))
            .action(Some(action));
        toast.dismissible = options.dismissible != Some(false);
        self.sink.show(toast)
    }

    /// Authentication toast: "Sign In" when a handler is given, else "Reload".
    pub fn show_auth_error_toast(&self, error: &AppError, on_sign_in: Option<Callback>) -> ToastId {
        let action = match on_sign_in {
            Some(cb) => ToastAction::new("Sign In", ActionHandler::Callback(cb)),
            None => ToastAction::new("Reload", ActionHandler::Reload),
        };
        let toast = self
            .error_toast(error)
            .duration(AUTH_DURATION)
            .position(ToastPosition::TopCenter)
            .action(Some(action));
        self.sink.show(toast)
    }

    /// Network toast: "Retry" with a "Connection Restored" follow-up, or
    /// "Reload" without a retry handler.
    pub fn show_network_error_toast(&self, error: &AppError, on_retry: Option<RetryFn>) -> ToastId {
        let action = match on_retry {
            Some(run) => self.retry_action(
                "Retry",
                run,
                "Connection Restored",
                "Successfully reconnected to the server.",
            ),
            None => ToastAction::new("Reload", ActionHandler::Reload),
        };
        let toast = self
            .error_toast(error)
            .duration(RETRY_DURATION)
            .position(ToastPosition::BottomRight)
            .action(Some(action));
        self.sink.show(toast)
    }

    /// Rate limit toast. `retry_after` is in seconds.
    pub fn show_rate_limit_toast(&self, error: &AppError, retry_after: Option<f64>) -> ToastId {
        let msg = get_error_message(error);
        let retry_after = retry_after.filter(|s| s.is_finite() && *s > 0.0);
        let (duration, description) = match retry_after {
            Some(secs) => (
                Duration::from_secs_f64(secs),
                format!("Please wait {} seconds before trying again.", secs.ceil() as u64),
            ),
            None => (RATE_LIMIT_DURATION, msg.message),
        };
        let toast = Toast::new(ToastKind::Error, msg.title)
            .description(description)
            .duration(duration)
            .position(ToastPosition::TopCenter);
        self.sink.show(toast)
    }

    /// Form validation toast. More than one message collapses into a count
    /// with a "View Details" action.
    pub fn show_validation_error_toast<S: AsRef<str>>(&self, errors: &[S], duration: Option<Duration>) -> ToastId {
        let lines: Vec<String> = errors.iter().map(|e| e.as_ref().to_owned()).collect();
        let mut toast = Toast::new(ToastKind::Error, "Validation Error")
            .duration(duration.unwrap_or(FORM_DURATION));
        match lines.len() {
            0 => {}
            1 => toast = toast.description(lines[0].clone()),
            n => {
                toast = toast
                    .description(format!("{n} issues need to be fixed."))
                    .action(Some(ToastAction::new("View Details", ActionHandler::Details(lines))));
            }
        }
        self.sink.show(toast)
    }

    /// Upload failure toast with an optional "Try Again" action.
    pub fn show_file_upload_error_toast(&self, error: &AppError, on_retry: Option<Callback>) -> ToastId {
        let toast = self
            .error_toast(error)
            .duration(FORM_DURATION)
            .action(on_retry.map(|cb| ToastAction::new("Try Again", ActionHandler::Callback(cb))));
        self.sink.show(toast)
    }

    /// Success toast.
    pub fn show_success_toast(&self, title: &str, description: Option<&str>, duration: Option<Duration>) -> ToastId {
        self.notice(ToastKind::Success, title, description, duration.unwrap_or(SUCCESS_DURATION))
    }

    /// Info toast.
    pub fn show_info_toast(&self, title: &str, description: Option<&str>, duration: Option<Duration>) -> ToastId {
        self.notice(ToastKind::Info, title, description, duration.unwrap_or(NOTICE_DURATION))
    }

    /// Warning toast.
    pub fn show_warning_toast(&self, title: &str, description: Option<&str>, duration: Option<Duration>) -> ToastId {
        self.notice(ToastKind::Warning, title, description, duration.unwrap_or(NOTICE_DURATION))
    }

    fn notice(&self, kind: ToastKind, title: &str, description: Option<&str>, duration: Duration) -> ToastId {
        let mut toast = Toast::new(kind, title).duration(duration);
        toast.description = description.map(str::to_owned);
        self.sink.show(toast)
    }

    /// Loading toast with no duration; replace it with [`Self::update_toast`].
    pub fn show_loading_toast(&self, title: &str, description: Option<&str>) -> ToastId {
        let mut toast = Toast::new(ToastKind::Loading, title);
        toast.description = description.map(str::to_owned);
        self.sink.show(toast)
    }

    /// Replace an existing toast in place. Defaults to 3 s.
    pub fn update_toast(
        &self,
        id: ToastId,
        kind: ToastKind,
        title: &str,
        description: Option<&str>,
        duration: Option<Duration>,
    ) {
        let mut toast = Toast::new(kind, title).duration(duration.unwrap_or(SUCCESS_DURATION));
        toast.description = description.map(str::to_owned);
        toast.id = Some(id);
        self.sink.show(toast);
    }

    /// Close one toast.
    pub fn dismiss_toast(&self, id: ToastId) {
        self.sink.dismiss(Some(id));
    }

    /// Close every toast.
    pub fn dismiss_all_toasts(&self) {
        self.sink.dismiss(None);
    }

    /// Show a loading toast while `future` runs, then turn it into a success
    /// or error toast. The future's result is passed through untouched.
    pub async fn promise_toast<T, E, Fut>(
        &self,
        future: Fut,
        loading: &str,
        success: &str,
        error: Option<&str>,
    ) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        let id = self.show_loading_toast(loading, None);
        let result = future.await;
        match &result {
            Ok(_) => self.update_toast(id, ToastKind::Success, success, None, None),
            Err(_) => self.update_toast(
                id,
                ToastKind::Error,
                error.unwrap_or("Operation failed"),
                None,
                None,
            ),
        }
        result
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::factory::{create_error, create_network_error};
    use crate::ErrorCode;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub(crate) shown: Mutex<Vec<Toast>>,
        pub(crate) dismissed: Mutex<Vec<Option<ToastId>>>,
        next: AtomicU64,
    }

    impl RecordingSink {
        pub(crate) fn last(&self) -> Toast {
            self.shown.lock().unwrap().last().cloned().unwrap()
        }

        pub(crate) fn count(&self) -> usize {
            self.shown.lock().unwrap().len()
        }
    }

    impl ToastSink for RecordingSink {
        fn show(&self, toast: Toast) -> ToastId {
            let id = toast
                .id
                .unwrap_or_else(|| ToastId(self.next.fetch_add(1, Ordering::SeqCst) + 1));
            self.shown.lock().unwrap().push(toast);
            id
        }

        fn dismiss(&self, id: Option<ToastId>) {
            self.dismissed.lock().unwrap().push(id);
        }
    }

    fn notifier() -> (Notifier, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        (Notifier::new(sink.clone()), sink)
    }

    #[tokio::test]
    async fn error_toast_defaults() {
        let (n, sink) = notifier();
        n.show_error_toast(&create_network_error(503, None, None, None), None);

        let toast = sink.last();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Service Unavailable");
        assert_eq!(toast.duration, Some(Duration::from_secs(5)));
        assert_eq!(toast.position, Some(ToastPosition::BottomRight));
        assert!(toast.dismissible);

        let action = toast.action.unwrap();
        assert_eq!(action.label, "Try Again Later");
        assert!(matches!(action.activate().await, ActionOutcome::Reload));
    }

    #[tokio::test]
    async fn non_retryable_error_toast_dismisses() {
        let (n, sink) = notifier();
        n.show_error_toast(
            &create_error(ErrorCode::Forbidden, None, None, None),
            Some(ToastOptions {
                dismissible: Some(false),
                ..ToastOptions::default()
            }),
        );
        let toast = sink.last();
        assert!(!toast.dismissible);
        assert!(matches!(toast.action.unwrap().activate().await, ActionOutcome::Dismissed));
    }

    #[tokio::test]
    async fn retry_toast_success_shows_follow_up() {
        let (n, sink) = notifier();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        n.show_retry_toast(
            &create_error(ErrorCode::QueryFailed, None, None, None),
            move || {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), AppError>(())
                }
            },
            None,
        );

        let toast = sink.last();
        assert_eq!(toast.duration, Some(Duration::from_secs(10)));
        let action = toast.action.unwrap();
        assert_eq!(action.label, "Retry");
        assert!(matches!(action.activate().await, ActionOutcome::RetrySucceeded(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let follow_up = sink.last();
        assert_eq!(follow_up.kind, ToastKind::Success);
        assert_eq!(follow_up.title, "Success");
        assert_eq!(follow_up.description.as_deref(), Some("The operation completed successfully."));
    }

    #[tokio::test]
    async fn retry_toast_failure_is_reported_not_raised() {
        let (n, sink) = notifier();
        n.show_retry_toast(
            &create_error(ErrorCode::QueryFailed, None, None, None),
            || async { Err::<(), _>("still down") },
            None,
        );
        let before = sink.count();
        match sink.last().action.unwrap().activate().await {
            ActionOutcome::RetryFailed(err) => assert_eq!(err.message(), "still down"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(sink.count(), before);
    }

    #[test]
    fn auth_toast_action_depends_on_handler() {
        let (n, sink) = notifier();
        let err = create_error(ErrorCode::TokenExpired, None, None, None);

        n.show_auth_error_toast(&err, None);
        let toast = sink.last();
        assert_eq!(toast.action.unwrap().label, "Reload");
        assert_eq!(toast.position, Some(ToastPosition::TopCenter));
        assert_eq!(toast.duration, Some(Duration::from_secs(8)));

        n.show_auth_error_toast(&err, Some(Arc::new(|| {})));
        assert_eq!(sink.last().action.unwrap().label, "Sign In");
    }

    #[test]
    fn rate_limit_toast_uses_retry_after() {
        let (n, sink) = notifier();
        let err = create_error(ErrorCode::RateLimitExceeded, None, None, None);

        n.show_rate_limit_toast(&err, Some(2.5));
        let toast = sink.last();
        assert_eq!(toast.duration, Some(Duration::from_millis(2_500)));
        assert_eq!(
            toast.description.as_deref(),
            Some("Please wait 3 seconds before trying again.")
        );

        n.show_rate_limit_toast(&err, None);
        let toast = sink.last();
        assert_eq!(toast.duration, Some(Duration::from_secs(30)));
        assert_eq!(toast.position, Some(ToastPosition::TopCenter));
    }

    #[tokio::test]
    async fn validation_toast_collapses_many_messages() {
        let (n, sink) = notifier();
        n.show_validation_error_toast(&["Email is required"], None);
        assert_eq!(sink.last().description.as_deref(), Some("Email is required"));
        assert!(sink.last().action.is_none());

        n.show_validation_error_toast(&["a", "b", "c"], None);
        let toast = sink.last();
        assert_eq!(toast.description.as_deref(), Some("3 issues need to be fixed."));
        match toast.action.unwrap().activate().await {
            ActionOutcome::Details(lines) => assert_eq!(lines, ["a", "b", "c"]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn notice_durations() {
        let (n, sink) = notifier();
        n.show_success_toast("Saved", None, None);
        assert_eq!(sink.last().duration, Some(Duration::from_secs(3)));
        n.show_info_toast("Heads up", Some("New jobs posted"), None);
        assert_eq!(sink.last().duration, Some(Duration::from_secs(4)));
        n.show_warning_toast("Careful", None, Some(Duration::from_secs(9)));
        assert_eq!(sink.last().duration, Some(Duration::from_secs(9)));
    }

    #[tokio::test]
    async fn promise_toast_updates_in_place() {
        let (n, sink) = notifier();
        let value = n
            .promise_toast(async { Ok::<_, AppError>(42) }, "Saving", "Saved", None)
            .await
            .unwrap();
        assert_eq!(value, 42);

        let shown = sink.shown.lock().unwrap();
        assert_eq!(shown[0].kind, ToastKind::Loading);
        assert_eq!(shown[1].kind, ToastKind::Success);
        assert_eq!(shown[1].id, Some(ToastId(1)));
    }

    #[tokio::test]
    async fn promise_toast_passes_error_through() {
        let (n, sink) = notifier();
        let result = n
            .promise_toast(async { Err::<(), _>("nope") }, "Saving", "Saved", None)
            .await;
        assert_eq!(result, Err("nope"));
        assert_eq!(sink.last().title, "Operation failed");
    }

    #[test]
    fn dismiss_forwards_to_sink() {
        let (n, sink) = notifier();
        n.dismiss_toast(ToastId(4));
        n.dismiss_all_toasts();
        assert_eq!(*sink.dismissed.lock().unwrap(), vec![Some(ToastId(4)), None]);
    }
}
