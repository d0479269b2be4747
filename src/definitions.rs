//! Static lookup tables compiled into the crate.
//!
//! # Tables
//!
//! - [`message_for`]: default title, message and action label per [`ErrorCode`]
//! - [`code_for_status`]: HTTP status to [`ErrorCode`]
//! - [`is_retryable_status`]: statuses worth retrying unchanged
//! - [`RETRY_DELAYS`]: the default backoff ladder
//!
//! None of these are configurable at runtime. Changing user-facing copy means
//! changing this file.

use crate::ErrorCode;
use std::time::Duration;

/// Default user-facing copy for one error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Toast heading.
    pub title: &'static str,
    /// Toast body.
    pub message: &'static str,
    /// Label of the single primary action.
    pub action: &'static str,
}

const fn template(
    title: &'static str,
    message: &'static str,
    action: &'static str,
) -> MessageTemplate {
    MessageTemplate {
        title,
        message,
        action,
    }
}

/// Look up the default copy for `code`.
pub const fn message_for(code: ErrorCode) -> MessageTemplate {
    use ErrorCode::*;
    match code {
        // -- network ---------------------------------------------------------
        NetworkError => template(
            "Connection Error",
            "We couldn't connect to our servers. Please check your internet connection and try again.",
            "Retry",
        ),
        TimeoutError => template(
            "Request Timeout",
            "The request took too long to complete. Please try again.",
            "Retry",
        ),
        ConnectionFailed => template(
            "Connection Failed",
            "Unable to establish a connection. Please check your network and try again.",
            "Retry",
        ),
        // -- identity --------------------------------------------------------
        Unauthorized => template(
            "Authentication Required",
            "Please sign in to access this feature.",
            "Sign In",
        ),
        TokenExpired => template(
            "Session Expired",
            "Your session has expired. Please sign in again.",
            "Sign In Again",
        ),
        InvalidCredentials => template(
            "Invalid Credentials",
            "The email or password you entered is incorrect. Please try again.",
            "Try Again",
        ),
        SessionExpired => template(
            "Session Expired",
            "Your session has expired due to inactivity. Please sign in again.",
            "Sign In Again",
        ),
        // -- authorization ---------------------------------------------------
        Forbidden => template(
            "Access Denied",
            "You don't have permission to access this resource. Contact your administrator if you think this is a mistake.",
            "Go Back",
        ),
        InsufficientPermissions => template(
            "Insufficient Permissions",
            "You need higher permissions to perform this action.",
            "Contact Admin",
        ),
        // -- data ------------------------------------------------------------
        NotFound => template(
            "Page Not Found",
            "The page you're looking for doesn't exist or has been moved.",
            "Go Home",
        ),
        ResourceNotFound => template(
            "Resource Not Found",
            "The requested resource could not be found.",
            "Go Back",
        ),
        ValidationError => template(
            "Validation Error",
            "Please check your input and correct any errors.",
            "Fix Errors",
        ),
        InvalidInput => template(
            "Invalid Input",
            "The information you provided is not valid. Please check and try again.",
            "Correct Input",
        ),
        DatabaseError => template(
            "Data Error",
            "There was a problem accessing your data. Please refresh the page and try again.",
            "Refresh",
        ),
        ConvexError => template(
            "Database Error",
            "We encountered an issue with our database. Please try again in a moment.",
            "Retry",
        ),
        QueryFailed => template(
            "Data Loading Error",
            "Failed to load the requested data. Please refresh the page.",
            "Refresh",
        ),
        MutationFailed => template(
            "Action Failed",
            "We couldn't complete your request. Please try again.",
            "Try Again",
        ),
        // -- operational -----------------------------------------------------
        InternalServerError => template(
            "Server Error",
            "Something went wrong on our end. Our team has been notified and is working on a fix.",
            "Try Again",
        ),
        ServiceUnavailable => template(
            "Service Unavailable",
            "Our service is temporarily unavailable for maintenance. Please try again later.",
            "Try Again Later",
        ),
        RateLimitExceeded => template(
            "Rate Limit Exceeded",
            "You've made too many requests. Please wait a moment before trying again.",
            "Wait and Retry",
        ),
        TooManyRequests => template(
            "Too Many Requests",
            "Please slow down your requests. You can try again in a few moments.",
            "Wait",
        ),
        FileTooLarge => template(
            "File Too Large",
            "The file you're trying to upload exceeds the maximum size limit.",
            "Choose Smaller File",
        ),
        InvalidFileType => template(
            "Invalid File Type",
            "This file type is not supported. Please choose a valid file.",
            "Choose Valid File",
        ),
        UploadFailed => template(
            "Upload Failed",
            "We couldn't upload your file. Please try again.",
            "Retry Upload",
        ),
        UnknownError => template(
            "Something Went Wrong",
            "An unexpected error occurred. Please try again or contact support if the problem persists.",
            "Try Again",
        ),
        UnexpectedError => template(
            "Unexpected Error",
            "We encountered an unexpected error. Please refresh the page and try again.",
            "Refresh Page",
        ),
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Map an HTTP status to an error code. Unlisted statuses map to
/// [`ErrorCode::NetworkError`].
pub const fn code_for_status(status: u16) -> ErrorCode {
    match status {
        400 => ErrorCode::ValidationError,
        401 => ErrorCode::Unauthorized,
        403 => ErrorCode::Forbidden,
        404 => ErrorCode::NotFound,
        408 | 504 => ErrorCode::TimeoutError,
        429 => ErrorCode::RateLimitExceeded,
        500 => ErrorCode::InternalServerError,
        502 | 503 => ErrorCode::ServiceUnavailable,
        _ => ErrorCode::NetworkError,
    }
}

/// Statuses for which an identical request may succeed later.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Whether `status` is in [`RETRYABLE_STATUSES`].
#[inline]
pub const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

// ============================================================================
// Retry ladder
// ============================================================================

/// Exponential backoff ladder for the default one second base delay.
pub const RETRY_DELAYS: [Duration; 5] = [
    Duration::from_millis(1_000),
    Duration::from_millis(2_000),
    Duration::from_millis(4_000),
    Duration::from_millis(8_000),
    Duration::from_millis(16_000),
];

/// Default number of attempts for retried operations.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Default base delay for retried operations.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1_000);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_has_copy() {
        for code in ErrorCode::ALL {
            let t = message_for(code);
            assert!(!t.title.is_empty(), "{code} has no title");
            assert!(!t.message.is_empty(), "{code} has no message");
            assert!(!t.action.is_empty(), "{code} has no action");
        }
    }

    #[test]
    fn status_table() {
        let expected = [
            (400, ErrorCode::ValidationError),
            (401, ErrorCode::Unauthorized),
            (403, ErrorCode::Forbidden),
            (404, ErrorCode::NotFound),
            (408, ErrorCode::TimeoutError),
            (429, ErrorCode::RateLimitExceeded),
            (500, ErrorCode::InternalServerError),
            (502, ErrorCode::ServiceUnavailable),
            (503, ErrorCode::ServiceUnavailable),
            (504, ErrorCode::TimeoutError),
            (0, ErrorCode::NetworkError),
            (418, ErrorCode::NetworkError),
            (501, ErrorCode::NetworkError),
        ];
        for (status, code) in expected {
            assert_eq!(code_for_status(status), code, "status {status}");
        }
    }

    #[test]
    fn retryable_statuses_agree_with_predicate() {
        for status in 0..=999u16 {
            assert_eq!(
                is_retryable_status(status),
                RETRYABLE_STATUSES.contains(&status),
                "status {status}"
            );
        }
    }

    #[test]
    fn retry_ladder_doubles() {
        assert_eq!(RETRY_DELAYS[0], DEFAULT_RETRY_DELAY);
        for pair in RETRY_DELAYS.windows(2) {
            assert_eq!(pair[1], pair[0] * 2);
        }
    }
}
