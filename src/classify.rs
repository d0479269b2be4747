//! Normalization and classification.
//!
//! [`normalize_error`] is the universal funnel: whatever a collaborator
//! produced, the caller gets back exactly one [`AppError`]. The predicates
//! here are pure functions of the error value, so identical errors are always
//! treated identically.
//!
//! # Message Heuristics
//!
//! Native errors that reach the funnel untyped are classified by a
//! case-insensitive substring match on their message:
//!
//! | marker                       | result                              |
//! |------------------------------|-------------------------------------|
//! | `network`, `fetch`           | network error, status 0             |
//! | `clerk`, `authentication`    | authentication error, provider clerk|
//! | `convex`                     | database error, query               |
//! | anything else                | `UNKNOWN_ERROR` keeping the message |
//!
//! Collaborator wrappers in [`api`](crate::api) and
//! [`database`](crate::database) produce typed errors themselves, so this
//! path only sees failures from code that has not been wrapped yet.

use crate::definitions;
use crate::factory::{create_authentication_error, create_database_error, create_error, create_network_error};
use crate::models::{AppError, AuthProvider, DbOperation, ErrorKind, OriginalError, Thrown};
use crate::{ErrorCode, Severity};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Convert any failure into an [`AppError`]. Never panics.
pub fn normalize_error(value: impl Into<Thrown>) -> AppError {
    match value.into() {
        Thrown::App(err) => err,
        Thrown::Exception(err) => {
            let message = err.to_string();
            let lowered = message.to_lowercase();
            let original: OriginalError = Arc::from(err);

            if lowered.contains("network") || lowered.contains("fetch") {
                create_network_error(0, None, None, Some(original))
            } else if lowered.contains("clerk") || lowered.contains("authentication") {
                create_authentication_error(false, Some(AuthProvider::Clerk), Some(original))
            } else if lowered.contains("convex") {
                create_database_error(DbOperation::Query, Some(original), None)
            } else {
                create_error(ErrorCode::UnknownError, Some(message), None, Some(original))
            }
        }
        Thrown::Message(message) => create_error(ErrorCode::UnknownError, Some(message), None, None),
        Thrown::Opaque => create_error(ErrorCode::UnexpectedError, None, None, None),
    }
}

/// Whether repeating the failed operation unchanged may succeed.
///
/// Network errors answer with their own flag; everything else falls back to
/// [`ErrorCode::is_retryable_by_default`].
pub fn is_retryable_error(error: &AppError) -> bool {
    match error.kind() {
        ErrorKind::Network { retryable, .. } => *retryable,
        _ => error.code().is_retryable_by_default(),
    }
}

/// Whether the error should be surfaced to operators immediately.
pub fn is_critical_error(error: &AppError) -> bool {
    error.severity() == Severity::Critical
        || matches!(
            error.code(),
            ErrorCode::InternalServerError | ErrorCode::DatabaseError
        )
}

/// Resolved user-facing copy for one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    /// Heading.
    pub title: String,
    /// Body.
    pub message: String,
    /// Primary action label.
    pub action: String,
}

/// Resolve the `{title, message, action}` triple for display.
///
/// The error's own title and message win; the action always comes from the
/// static table.
pub fn get_error_message(error: &AppError) -> UserMessage {
    let template = definitions::message_for(error.code());
    let title = error.title().unwrap_or(template.title);
    let message = if error.message().is_empty() {
        template.message
    } else {
        error.message()
    };
    UserMessage {
        title: title.to_owned(),
        message: message.to_owned(),
        action: template.action.to_owned(),
    }
}

/// Serializable view for logs, without the causing error.
#[inline]
pub fn extract_error_info(error: &AppError) -> crate::ErrorInfo<'_> {
    error.info()
}

static ERROR_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Unique id for tracking a logged error, `err_<millis>_<suffix>`.
pub fn generate_error_id() -> String {
    prefixed_id("err")
}

pub(crate) fn prefixed_id(prefix: &str) -> String {
    let seq = ERROR_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{}_{}", crate::models::unix_millis(), base36(seq, 9))
}

fn base36(mut n: u64, width: usize) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut buf = vec![b'0'; width];
    for slot in buf.iter_mut().rev() {
        *slot = DIGITS[(n % 36) as usize];
        n /= 36;
    }
    String::from_utf8(buf).unwrap_or_default()
}
