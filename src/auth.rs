//! Identity-provider failures and session checks.
//!
//! The pure helpers ([`translate_provider_errors`], [`check_session_validity`],
//! [`needs_reauth`], [`create_auth_error`]) only build errors. The
//! [`AuthErrorHandler`] additionally logs them and decides which toast the
//! user sees.
//!
//! # Toast Routing
//!
//! | error                              | toast                          |
//! |------------------------------------|--------------------------------|
//! | `UNAUTHORIZED`, `TOKEN_EXPIRED`    | sign-in toast                  |
//! | retryable                          | retry toast                    |
//! | anything else                      | plain error toast              |

use crate::classify::{is_retryable_error, normalize_error};
use crate::factory::{create_authorization_error, create_error};
use crate::logging::ErrorLogger;
use crate::models::{AppError, AuthProvider, ErrorKind, Thrown};
use crate::toast::{ActionHandler, Callback, Notifier, RetryFn, ToastAction, ToastId, ToastOptions};
use crate::{ErrorCode, ErrorContext};
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

// ============================================================================
// Provider errors
// ============================================================================

/// One entry of the identity provider's error array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderErrorItem {
    /// Machine code such as `session_expired`.
    pub code: Option<String>,
    /// Short human message.
    pub message: Option<String>,
    /// Long human message.
    pub long_message: Option<String>,
}

/// Error payload as returned by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderErrorList {
    /// Errors, most relevant first.
    pub errors: Vec<ProviderErrorItem>,
}

impl fmt::Display for ProviderErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first().and_then(|e| e.message.as_deref()) {
            Some(message) => write!(f, "clerk: {message}"),
            None => f.write_str("clerk: authentication failed"),
        }
    }
}

impl std::error::Error for ProviderErrorList {}

impl From<ProviderErrorList> for Thrown {
    fn from(list: ProviderErrorList) -> Self {
        Thrown::App(translate_provider_errors(&list))
    }
}

fn provider_code_map(code: &str) -> Option<(ErrorCode, &'static str)> {
    Some(match code {
        "authentication_invalid" => (ErrorCode::InvalidCredentials, "Invalid email or password"),
        "token_verification_failed" => (ErrorCode::TokenExpired, "Your session has expired"),
        "session_expired" => (
            ErrorCode::SessionExpired,
            "Your session has expired due to inactivity",
        ),
        "forbidden" => (
            ErrorCode::Forbidden,
            "You don't have permission to access this resource",
        ),
        "rate_limit_exceeded" => (
            ErrorCode::RateLimitExceeded,
            "Too many authentication attempts. Please try again later",
        ),
        _ => return None,
    })
}

/// Translate a provider error list into an authentication error.
///
/// Only the first entry is considered. Unknown codes become `UNAUTHORIZED`
/// with the provider's message, or `"Authentication failed"`.
pub fn translate_provider_errors(list: &ProviderErrorList) -> AppError {
    let first = list.errors.first();
    let (code, message) = match first.and_then(|e| e.code.as_deref()).and_then(provider_code_map) {
        Some((code, message)) => (code, message.to_owned()),
        None => (
            ErrorCode::Unauthorized,
            first
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| "Authentication failed".to_owned()),
        ),
    };

    create_error(
        code,
        Some(message),
        Some(ErrorContext::new().with("provider", AuthProvider::Clerk.as_str())),
        Some(std::sync::Arc::new(list.clone())),
    )
    .with_kind(ErrorKind::Authentication {
        provider: Some(AuthProvider::Clerk),
        requires_reauth: code == ErrorCode::TokenExpired,
    })
}

// ============================================================================
// Sessions
// ============================================================================

/// The subset of a provider session this crate looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionInfo {
    /// Expiry, ms since epoch.
    pub expire_at: Option<u64>,
    /// Provider status such as `active` or `revoked`.
    pub status: Option<String>,
}

/// Caller facts attached to auth errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Signed-in user.
    pub user_id: Option<String>,
    /// Email used.
    pub email: Option<String>,
    /// Session id.
    pub session_id: Option<String>,
    /// What was being done.
    pub operation: Option<String>,
    /// Resource involved.
    pub resource: Option<String>,
    /// Action attempted.
    pub action: Option<String>,
}

impl AuthContext {
    fn to_context(&self) -> ErrorContext {
        ErrorContext::new()
            .with_opt("userId", self.user_id.clone())
            .with_opt("email", self.email.clone())
            .with_opt("sessionId", self.session_id.clone())
            .with_opt("operation", self.operation.clone())
            .with_opt("resource", self.resource.clone())
            .with_opt("action", self.action.clone())
    }
}

/// Build an authentication error with an explicit code.
///
/// `code` is expected to be one of the identity codes; `TOKEN_EXPIRED` marks
/// the error as requiring re-authentication.
pub fn create_auth_error(code: ErrorCode, message: Option<&str>, context: Option<&AuthContext>) -> AppError {
    let mut ctx = ErrorContext::new().with("provider", AuthProvider::Clerk.as_str());
    if let Some(c) = context {
        ctx.merge(c.to_context());
    }
    create_error(code, message.map(str::to_owned), Some(ctx), None).with_kind(ErrorKind::Authentication {
        provider: Some(AuthProvider::Clerk),
        requires_reauth: code == ErrorCode::TokenExpired,
    })
}

/// Check a session at time `now_ms`. `None` means the session is usable.
pub fn check_session_validity(
    session: Option<&SessionInfo>,
    now_ms: u64,
    context: Option<&AuthContext>,
) -> Option<AppError> {
    let Some(session) = session else {
        return Some(create_auth_error(
            ErrorCode::Unauthorized,
            Some("No active session found"),
            context,
        ));
    };

    if session.expire_at.is_some_and(|at| at < now_ms) {
        return Some(create_auth_error(
            ErrorCode::SessionExpired,
            Some("Your session has expired"),
            context,
        ));
    }

    if session.status.as_deref() == Some("revoked") {
        return Some(create_auth_error(
            ErrorCode::Unauthorized,
            Some("Your session has been revoked"),
            context,
        ));
    }

    None
}

/// Whether the user has to sign in again.
pub fn needs_reauth(error: &AppError) -> bool {
    matches!(
        error.code(),
        ErrorCode::TokenExpired | ErrorCode::SessionExpired | ErrorCode::Unauthorized
    )
}

// ============================================================================
// Handler
// ============================================================================

/// Step of the sign-in lifecycle that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFlowStep {
    /// Signing in.
    SignIn,
    /// Creating an account.
    SignUp,
    /// Signing out; never toasted.
    SignOut,
    /// Token refresh; never toasted.
    Refresh,
    /// Email or second-factor verification.
    Verify,
}

impl AuthFlowStep {
    /// Snake-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
            Self::SignOut => "sign_out",
            Self::Refresh => "refresh",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for AuthFlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Toast hooks for [`AuthErrorHandler::handle_auth_error`].
#[derive(Clone)]
pub struct AuthToastOptions {
    /// Sign-in handler for the sign-in toast.
    pub on_sign_in: Option<Callback>,
    /// Retry handler for retryable errors. Without one the toast reloads.
    pub on_retry: Option<RetryFn>,
    /// Set to `false` to only log.
    pub show_toast: bool,
}

impl Default for AuthToastOptions {
    fn default() -> Self {
        Self {
            on_sign_in: None,
            on_retry: None,
            show_toast: true,
        }
    }
}

impl fmt::Debug for AuthToastOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToastOptions")
            .field("on_sign_in", &self.on_sign_in.is_some())
            .field("on_retry", &self.on_retry.is_some())
            .field("show_toast", &self.show_toast)
            .finish()
    }
}

/// Logs auth failures and shows the matching toast.
#[derive(Debug, Clone)]
pub struct AuthErrorHandler {
    logger: ErrorLogger,
    notifier: Notifier,
}

impl AuthErrorHandler {
    /// Handler over the given logger and notifier.
    pub fn new(logger: ErrorLogger, notifier: Notifier) -> Self {
        Self { logger, notifier }
    }

    fn reload_retry_toast(&self, error: &AppError) -> ToastId {
        self.notifier.show_error_toast(
            error,
            Some(ToastOptions {
                duration: Some(Duration::from_secs(10)),
                action: Some(ToastAction::new("Retry", ActionHandler::Reload)),
                ..ToastOptions::default()
            }),
        )
    }

    /// Normalize, annotate, log and toast an authentication failure.
    pub fn handle_auth_error(
        &self,
        error: impl Into<Thrown>,
        context: Option<&AuthContext>,
        options: AuthToastOptions,
    ) -> AppError {
        let mut app_error = normalize_error(error);
        app_error.merge_context(ErrorContext::new().with("component", "Authentication"));
        if let Some(c) = context {
            app_error.merge_context(c.to_context());
        }

        let log_context = ErrorContext::new()
            .with("component", "Authentication")
            .with(
                "operation",
                context
                    .and_then(|c| c.operation.clone())
                    .unwrap_or_else(|| "unknown".to_owned()),
            )
            .with_opt("userId", context.and_then(|c| c.user_id.clone()))
            .with_opt("email", context.and_then(|c| c.email.clone()));
        self.logger.log(&app_error, Some(log_context));

        if options.show_toast {
            if matches!(app_error.code(), ErrorCode::Unauthorized | ErrorCode::TokenExpired) {
                self.notifier.show_auth_error_toast(&app_error, options.on_sign_in);
            } else if is_retryable_error(&app_error) {
                match options.on_retry {
                    Some(run) => {
                        self.notifier.show_retry_toast(&app_error, move || run(), None);
                    }
                    None => {
                        self.reload_retry_toast(&app_error);
                    }
                }
            } else {
                self.notifier.show_error_toast(&app_error, None);
            }
        }

        app_error
    }

    /// Translate and handle an identity-provider error list.
    pub fn handle_clerk_error(&self, errors: &ProviderErrorList, context: Option<&AuthContext>) -> AppError {
        self.handle_auth_error(
            translate_provider_errors(errors),
            context,
            AuthToastOptions::default(),
        )
    }

    /// Build, log and toast a permission failure.
    pub fn handle_authz_error(
        &self,
        resource: &str,
        action: &str,
        user_role: Option<&str>,
        required_role: Option<&str>,
        context: Option<&AuthContext>,
    ) -> AppError {
        let mut error = create_authorization_error(Some(resource), Some(action), required_role);
        error.merge_context(
            ErrorContext::new()
                .with_opt("userRole", user_role.map(str::to_owned))
                .with("component", "Authorization"),
        );
        if let Some(c) = context {
            error.merge_context(c.to_context());
        }

        let log_context = ErrorContext::new()
            .with("component", "Authorization")
            .with("operation", action.to_owned())
            .with("resource", resource.to_owned())
            .with_opt("userRole", user_role.map(str::to_owned))
            .with_opt("requiredRole", required_role.map(str::to_owned))
            .with_opt("userId", context.and_then(|c| c.user_id.clone()));
        self.logger.log(&error, Some(log_context));

        self.notifier.show_error_toast(&error, None);
        error
    }

    /// Handle a failure in one step of the auth lifecycle.
    pub fn handle_auth_flow_error(
        &self,
        step: AuthFlowStep,
        error: impl Into<Thrown>,
        context: Option<&AuthContext>,
    ) -> AppError {
        let mut app_error = normalize_error(error);
        app_error.merge_context(
            ErrorContext::new()
                .with("component", "AuthFlow")
                .with("authStep", step.as_str()),
        );
        if let Some(c) = context {
            app_error.merge_context(c.to_context());
        }

        self.logger.log_user_action(
            &format!("Auth flow error: {step}"),
            Some(serde_json::json!({
                "error": app_error.message(),
                "code": app_error.code(),
            })),
        );
        self.logger.log(
            &app_error,
            Some(
                ErrorContext::new()
                    .with("component", "AuthFlow")
                    .with("operation", step.as_str())
                    .with_opt("userId", context.and_then(|c| c.user_id.clone())),
            ),
        );

        match step {
            AuthFlowStep::SignIn if app_error.code() == ErrorCode::InvalidCredentials => {
                self.notifier.show_auth_error_toast(&app_error, None);
            }
            AuthFlowStep::SignUp if app_error.code() == ErrorCode::ValidationError => {
                self.notifier.show_error_toast(&app_error, None);
            }
            AuthFlowStep::SignIn | AuthFlowStep::SignUp => {
                self.reload_retry_toast(&app_error);
            }
            AuthFlowStep::SignOut | AuthFlowStep::Refresh => {}
            AuthFlowStep::Verify => {
                self.notifier.show_auth_error_toast(&app_error, None);
            }
        }

        app_error
    }

    /// Await `operation`, routing any failure through
    /// [`Self::handle_auth_error`].
    pub async fn with_auth_handling<T, E, Fut>(
        &self,
        operation: Fut,
        context: Option<&AuthContext>,
    ) -> Result<T, AppError>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<Thrown>,
    {
        operation
            .await
            .map_err(|e| self.handle_auth_error(e, context, AuthToastOptions::default()))
    }
}
