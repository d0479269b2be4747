//! Error code namespace - the closed set of failure kinds the platform knows.
//!
//! Every [`AppError`](crate::AppError) carries exactly one [`ErrorCode`]. The
//! code alone is enough to pick the default title, message and action (see
//! [`definitions`](crate::definitions)) and to decide default retryability.
//!
//! # Groups
//!
//! - **Network**: connectivity failures (`NETWORK_ERROR`, `TIMEOUT_ERROR`, `CONNECTION_FAILED`)
//! - **Identity**: who the caller is (`UNAUTHORIZED`, `TOKEN_EXPIRED`, ...)
//! - **Authorization**: what the caller may do (`FORBIDDEN`, `INSUFFICIENT_PERMISSIONS`)
//! - **Data**: lookups, validation and the reactive database
//! - **Operational**: server health, rate limiting, uploads and the catch-alls
//!
//! # Wire Format
//!
//! Codes serialize as their SCREAMING_SNAKE_CASE names (`"DATABASE_ERROR"`),
//! which is also what [`ErrorCode::as_str`] and `Display` produce.
//!
//! ```rust
//! use hireline_errors::{ErrorCode, ErrorGroup};
//!
//! let code: ErrorCode = "RATE_LIMIT_EXCEEDED".parse().unwrap();
//! assert_eq!(code, ErrorCode::RateLimitExceeded);
//! assert_eq!(code.group(), ErrorGroup::Operational);
//! assert_eq!(code.to_string(), "RATE_LIMIT_EXCEEDED");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Error Codes
// ============================================================================

/// Closed set of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Generic connectivity failure.
    NetworkError,
    /// The request or upstream took too long.
    TimeoutError,
    /// A connection could not be established.
    ConnectionFailed,
    /// No authenticated identity.
    Unauthorized,
    /// The session token is no longer valid.
    TokenExpired,
    /// Wrong email or password.
    InvalidCredentials,
    /// Session ended through inactivity.
    SessionExpired,
    /// Identity is known but access is denied.
    Forbidden,
    /// Identity lacks the role required for the action.
    InsufficientPermissions,
    /// Page or route does not exist.
    NotFound,
    /// A specific record does not exist.
    ResourceNotFound,
    /// Upstream reported an internal failure.
    InternalServerError,
    /// Upstream is down or in maintenance.
    ServiceUnavailable,
    /// Input failed validation.
    ValidationError,
    /// Input was structurally invalid.
    InvalidInput,
    /// Generic data-access failure.
    DatabaseError,
    /// Failure reported by the reactive database client.
    ConvexError,
    /// A read query failed.
    QueryFailed,
    /// A write mutation failed.
    MutationFailed,
    /// Caller exceeded the allowed request rate.
    RateLimitExceeded,
    /// Caller is sending requests too quickly.
    TooManyRequests,
    /// Uploaded file exceeds the size limit.
    FileTooLarge,
    /// Uploaded file type is not accepted.
    InvalidFileType,
    /// Upload failed in transit.
    UploadFailed,
    /// A failure with a known message but no specific classification.
    UnknownError,
    /// A failure with no usable detail at all.
    UnexpectedError,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 26] = [
        Self::NetworkError,
        Self::TimeoutError,
        Self::ConnectionFailed,
        Self::Unauthorized,
        Self::TokenExpired,
        Self::InvalidCredentials,
        Self::SessionExpired,
        Self::Forbidden,
        Self::InsufficientPermissions,
        Self::NotFound,
        Self::ResourceNotFound,
        Self::InternalServerError,
        Self::ServiceUnavailable,
        Self::ValidationError,
        Self::InvalidInput,
        Self::DatabaseError,
        Self::ConvexError,
        Self::QueryFailed,
        Self::MutationFailed,
        Self::RateLimitExceeded,
        Self::TooManyRequests,
        Self::FileTooLarge,
        Self::InvalidFileType,
        Self::UploadFailed,
        Self::UnknownError,
        Self::UnexpectedError,
    ];

    /// Canonical wire name. Zero allocation.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetworkError => "NETWORK_ERROR",
            Self::TimeoutError => "TIMEOUT_ERROR",
            Self::ConnectionFailed => "CONNECTION_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            Self::NotFound => "NOT_FOUND",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidInput => "INVALID_INPUT",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ConvexError => "CONVEX_ERROR",
            Self::QueryFailed => "QUERY_FAILED",
            Self::MutationFailed => "MUTATION_FAILED",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::InvalidFileType => "INVALID_FILE_TYPE",
            Self::UploadFailed => "UPLOAD_FAILED",
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }

    /// Conceptual group this code belongs to.
    #[inline]
    pub const fn group(self) -> ErrorGroup {
        use ErrorCode::*;
        match self {
            NetworkError | TimeoutError | ConnectionFailed => ErrorGroup::Network,
            Unauthorized | TokenExpired | InvalidCredentials | SessionExpired => {
                ErrorGroup::Identity
            }
            Forbidden | InsufficientPermissions => ErrorGroup::Authorization,
            NotFound | ResourceNotFound | ValidationError | InvalidInput | DatabaseError
            | ConvexError | QueryFailed | MutationFailed => ErrorGroup::Data,
            InternalServerError | ServiceUnavailable | RateLimitExceeded | TooManyRequests
            | FileTooLarge | InvalidFileType | UploadFailed | UnknownError | UnexpectedError => {
                ErrorGroup::Operational
            }
        }
    }

    /// Whether this code is transient by default.
    ///
    /// Network errors carry their own flag which takes precedence; see
    /// [`is_retryable_error`](crate::is_retryable_error).
    #[inline]
    pub const fn is_retryable_by_default(self) -> bool {
        matches!(
            self,
            Self::NetworkError
                | Self::TimeoutError
                | Self::ConnectionFailed
                | Self::DatabaseError
                | Self::ConvexError
                | Self::ServiceUnavailable
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = UnknownCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownCodeError {
                value: s.to_owned(),
            })
    }
}

/// Returned when parsing a string that is not a known [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCodeError {
    value: String,
}

impl UnknownCodeError {
    /// The rejected input.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for UnknownCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown error code '{}'", self.value)
    }
}

impl std::error::Error for UnknownCodeError {}

// ============================================================================
// Groups
// ============================================================================

/// Conceptual grouping of error codes, used for dashboards and log routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorGroup {
    /// Connectivity and transport.
    Network,
    /// Authentication state.
    Identity,
    /// Permission checks.
    Authorization,
    /// Lookups, validation and persistence.
    Data,
    /// Server health, throttling, uploads and uncategorized failures.
    Operational,
}

impl ErrorGroup {
    /// Human readable name.
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Identity => "Identity",
            Self::Authorization => "Authorization",
            Self::Data => "Data",
            Self::Operational => "Operational",
        }
    }
}

// ============================================================================
// Severity
// ============================================================================

/// How loudly an error should be surfaced.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Cosmetic or expected.
    Low,
    /// Default for factory-built errors.
    #[default]
    Medium,
    /// Degrades a user-facing flow.
    High,
    /// Needs immediate attention.
    Critical,
}

impl Severity {
    /// Lowercase wire name.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
