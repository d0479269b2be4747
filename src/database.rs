//! Boundary wrappers for reactive database calls.
//!
//! Queries and mutations are awaited inside the wrappers; any failure is
//! normalized, tagged with the operation name, logged, and returned as an
//! [`OperationFailure`] carrying a precomputed retry hint.
//!
//! ```rust,no_run
//! use hireline_errors::config::ErrorKitConfig;
//! use hireline_errors::database::{DatabaseErrorHandler, OperationContext};
//! use hireline_errors::logging::ErrorLogger;
//!
//! # async fn list_jobs() -> Result<Vec<String>, std::io::Error> { Ok(vec![]) }
//! # async fn run() {
//! let db = DatabaseErrorHandler::new(ErrorLogger::new(ErrorKitConfig::default()));
//! match db.handle_query("jobs:list", list_jobs(), &OperationContext::default()).await {
//!     Ok(jobs) => println!("{} jobs", jobs.len()),
//!     Err(failure) if failure.retryable => println!("try again later"),
//!     Err(failure) => println!("{}", failure.error),
//! }
//! # }
//! ```

use crate::classify::{is_retryable_error, normalize_error};
use crate::factory::{create_authentication_error, create_authorization_error};
use crate::logging::ErrorLogger;
use crate::models::{AppError, AuthProvider, Thrown};
use crate::ErrorContext;
use std::fmt;
use std::future::Future;

#[cfg(any(feature = "tokio", feature = "async_std"))]
use crate::retry::{RetryOptions, retry_operation};

/// A failed database call.
#[derive(Debug, Clone)]
pub struct OperationFailure {
    /// Normalized error.
    pub error: AppError,
    /// Whether calling again may help. Always `false` after retries ran out.
    pub retryable: bool,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl std::error::Error for OperationFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<OperationFailure> for AppError {
    fn from(failure: OperationFailure) -> Self {
        failure.error
    }
}

/// Result of a wrapped database call.
pub type OperationResult<T> = Result<T, OperationFailure>;

/// Caller facts attached to failures.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    /// Signed-in user.
    pub user_id: Option<String>,
    /// Extra keys merged into the error's context.
    pub additional: ErrorContext,
}

/// Wraps database calls with normalization and logging.
#[derive(Debug, Clone)]
pub struct DatabaseErrorHandler {
    logger: ErrorLogger,
}

impl DatabaseErrorHandler {
    /// Handler logging through `logger`.
    pub fn new(logger: ErrorLogger) -> Self {
        Self { logger }
    }

    fn fail(
        &self,
        error: impl Into<Thrown>,
        name: &str,
        operation_type: &'static str,
        component: &'static str,
        context: &OperationContext,
    ) -> AppError {
        let mut error = normalize_error(error);
        error.merge_context(
            ErrorContext::new()
                .with("databaseOperation", name.to_owned())
                .with("operationType", operation_type),
        );
        error.merge_context(context.additional.clone());

        self.logger.log(
            &error,
            Some(
                ErrorContext::new()
                    .with("component", component)
                    .with("operation", name.to_owned())
                    .with_opt("userId", context.user_id.clone()),
            ),
        );
        error
    }

    /// Await a query.
    pub async fn handle_query<T, E, Fut>(
        &self,
        name: &str,
        query: Fut,
        context: &OperationContext,
    ) -> OperationResult<T>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<Thrown>,
    {
        query.await.map_err(|e| {
            let error = self.fail(e, name, "query", "DatabaseQuery", context);
            OperationFailure {
                retryable: is_retryable_error(&error),
                error,
            }
        })
    }

    /// Await a mutation.
    pub async fn handle_mutation<T, E, Fut>(
        &self,
        name: &str,
        mutation: Fut,
        context: &OperationContext,
    ) -> OperationResult<T>
    where
        Fut: Future<Output = Result<T, E>>,
        E: Into<Thrown>,
    {
        mutation.await.map_err(|e| {
            let error = self.fail(e, name, "mutation", "DatabaseMutation", context);
            OperationFailure {
                retryable: is_retryable_error(&error),
                error,
            }
        })
    }

    /// Run a mutation through [`retry_operation`], logging every retry.
    #[cfg(any(feature = "tokio", feature = "async_std"))]
    pub async fn handle_mutation_with_retry<T, E, F, Fut>(
        &self,
        name: &str,
        mutation: F,
        options: RetryOptions,
        context: &OperationContext,
    ) -> OperationResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<Thrown>,
    {
        let logger = self.logger.clone();
        let operation = name.to_owned();
        let user_id = context.user_id.clone();
        let options = options.also_on_retry(move |attempt, error| {
            logger.log(
                error,
                Some(
                    ErrorContext::new()
                        .with("component", "DatabaseMutationRetry")
                        .with("operation", operation.clone())
                        .with("attempt", attempt)
                        .with_opt("userId", user_id.clone()),
                ),
            );
        });

        retry_operation(mutation, options).await.map_err(|e| {
            let mut error = self.fail(e, name, "mutation_with_retry", "DatabaseMutationRetry", context);
            error.merge_context(ErrorContext::new().with("finalAttempt", true));
            OperationFailure {
                error,
                retryable: false,
            }
        })
    }
}

/// Fail unless an authenticated identity is present.
pub fn require_identity<I>(identity: Option<I>) -> Result<I, AppError> {
    identity.ok_or_else(|| {
        create_authentication_error(false, Some(AuthProvider::Clerk), None)
            .set_message("User must be authenticated to perform this action")
    })
}

/// Fail unless `current_user_id` owns the resource.
pub fn require_owner(
    resource_owner: &str,
    current_user_id: &str,
    resource: &str,
    action: &str,
) -> Result<(), AppError> {
    if resource_owner == current_user_id {
        Ok(())
    } else {
        Err(create_authorization_error(Some(resource), Some(action), None))
    }
}
