//! Factories - the only way [`AppError`] values come into existence.
//!
//! Each factory picks the right [`ErrorCode`] and fills the variant payload.
//! Severity is [`Severity::Medium`](crate::Severity::Medium) unless a caller
//! overrides it with [`AppError::with_severity`].
//!
//! ```rust
//! use hireline_errors::{create_network_error, ErrorCode, ErrorKind};
//!
//! let err = create_network_error(503, Some("/api/jobs"), Some("GET"), None);
//! assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
//! assert!(matches!(err.kind(), ErrorKind::Network { retryable: true, .. }));
//! ```

use crate::definitions::{code_for_status, is_retryable_status};
use crate::models::{
    AppError, AuthProvider, DbOperation, ErrorKind, FileUploadDetails, OriginalError,
    UploadFailureReason,
};
use crate::{ErrorCode, ErrorContext};
use std::collections::BTreeMap;

/// Build a base error.
///
/// `message` replaces the table default when present. A backtrace is
/// captured only when `original_error` is given.
pub fn create_error(
    code: ErrorCode,
    message: Option<String>,
    context: Option<ErrorContext>,
    original_error: Option<OriginalError>,
) -> AppError {
    let mut err = AppError::new(code);
    if let Some(message) = message {
        err = err.set_message(message);
    }
    if let Some(context) = context {
        err.merge_context(context);
    }
    if let Some(original) = original_error {
        err = err.set_original(original);
    }
    err
}

/// Build a network error from an HTTP status. Use status `0` when no
/// response arrived.
pub fn create_network_error(
    status: u16,
    url: Option<&str>,
    method: Option<&str>,
    original_error: Option<OriginalError>,
) -> AppError {
    let context = ErrorContext::new()
        .with_opt("url", url.map(str::to_owned))
        .with_opt("method", method.map(str::to_owned));

    create_error(code_for_status(status), None, Some(context), original_error).with_kind(
        ErrorKind::Network {
            status,
            url: url.map(str::to_owned),
            method: method.map(str::to_owned),
            retryable: is_retryable_status(status),
        },
    )
}

/// Build a validation error for one field.
pub fn create_validation_error(
    field: impl Into<String>,
    message: impl Into<String>,
    value: Option<String>,
    constraints: Option<BTreeMap<String, String>>,
) -> AppError {
    create_error(ErrorCode::ValidationError, Some(message.into()), None, None).with_kind(
        ErrorKind::Validation {
            field: Some(field.into()),
            value,
            constraints: constraints.unwrap_or_default(),
        },
    )
}

/// Build a database error.
pub fn create_database_error(
    operation: DbOperation,
    original_error: Option<OriginalError>,
    context: Option<ErrorContext>,
) -> AppError {
    create_error(ErrorCode::DatabaseError, None, context, original_error).with_kind(
        ErrorKind::Database {
            operation,
            table: None,
            query: None,
        },
    )
}

/// Build an authentication error. `requires_reauth` selects
/// `TOKEN_EXPIRED` over `UNAUTHORIZED`.
pub fn create_authentication_error(
    requires_reauth: bool,
    provider: Option<AuthProvider>,
    original_error: Option<OriginalError>,
) -> AppError {
    let code = if requires_reauth {
        ErrorCode::TokenExpired
    } else {
        ErrorCode::Unauthorized
    };
    let context = ErrorContext::new().with_opt("provider", provider.map(AuthProvider::as_str));

    create_error(code, None, Some(context), original_error).with_kind(ErrorKind::Authentication {
        provider,
        requires_reauth,
    })
}

/// Build an authorization error.
pub fn create_authorization_error(
    resource: Option<&str>,
    action: Option<&str>,
    required_role: Option<&str>,
) -> AppError {
    create_error(ErrorCode::Forbidden, None, None, None).with_kind(ErrorKind::Authorization {
        resource: resource.map(str::to_owned),
        action: action.map(str::to_owned),
        required_role: required_role.map(str::to_owned),
    })
}

/// Build a file upload error.
pub fn create_file_upload_error(
    file_name: impl Into<String>,
    reason: UploadFailureReason,
    details: Option<FileUploadDetails>,
) -> AppError {
    let code = match reason {
        UploadFailureReason::Size => ErrorCode::FileTooLarge,
        UploadFailureReason::Type => ErrorCode::InvalidFileType,
        UploadFailureReason::Upload => ErrorCode::UploadFailed,
    };
    let details = details.unwrap_or_default();

    create_error(code, None, None, None).with_kind(ErrorKind::FileUpload {
        file_name: file_name.into(),
        file_size: details.file_size,
        file_type: details.file_type,
        max_file_size: details.max_file_size,
        allowed_types: details.allowed_types,
    })
}
