//! The canonical error value and the input it is normalized from.
//!
//! # Architecture
//!
//! - [`AppError`]: common fields (code, message, severity, context, ...) plus
//!   an [`ErrorKind`] payload for the variant-specific details.
//! - [`ErrorKind`]: one variant per failure family. Variant fields are
//!   informational; classification never needs them, except the network
//!   variant's `retryable` flag which refines the code-based default.
//! - [`Thrown`]: everything a caller might hand to
//!   [`normalize_error`](crate::normalize_error). "Is this already an
//!   `AppError`" is a match arm, not a runtime shape probe.
//!
//! # Mutability
//!
//! An `AppError` is a value object. After construction only its context can
//! change, and only by merging new keys in.
//!
//! # Serialization
//!
//! [`AppError::info`] produces a serializable view. The causing error is
//! never part of it; it stays in-process for `source()` chains only.

use crate::{ErrorCode, ErrorContext, Severity, definitions};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Shared handle to whatever caused an [`AppError`].
pub type OriginalError = Arc<dyn Error + Send + Sync + 'static>;

// ============================================================================
// Variant payloads
// ============================================================================

/// Kind of database call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbOperation {
    /// Read.
    Query,
    /// Write.
    Mutation,
    /// Live subscription.
    Subscription,
}

impl DbOperation {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

/// Identity provider that raised an authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    /// Hosted identity provider.
    Clerk,
    /// In-house checks.
    Custom,
}

impl AuthProvider {
    /// Lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clerk => "clerk",
            Self::Custom => "custom",
        }
    }
}

/// Why an upload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadFailureReason {
    /// Over the size limit.
    Size,
    /// Type not in the allow-list.
    Type,
    /// Transfer failed.
    Upload,
}

/// Optional facts about a rejected upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileUploadDetails {
    /// Actual size in bytes.
    pub file_size: Option<u64>,
    /// MIME type.
    pub file_type: Option<String>,
    /// Limit in bytes.
    pub max_file_size: Option<u64>,
    /// Accepted MIME types.
    pub allowed_types: Vec<String>,
}

/// Variant-specific payload of an [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ErrorKind {
    /// Transport or HTTP failure.
    Network {
        /// HTTP status, `0` when no response was received.
        status: u16,
        /// Request URL.
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        /// Request method.
        #[serde(skip_serializing_if = "Option::is_none")]
        method: Option<String>,
        /// Whether repeating the identical request may succeed.
        retryable: bool,
    },
    /// Rejected input.
    Validation {
        /// Offending field.
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
        /// Offending value, rendered as text.
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        /// Constraint name to description.
        #[serde(skip_serializing_if = "BTreeMap::is_empty")]
        constraints: BTreeMap<String, String>,
    },
    /// Reactive database failure.
    Database {
        /// Call kind.
        operation: DbOperation,
        /// Table touched.
        #[serde(skip_serializing_if = "Option::is_none")]
        table: Option<String>,
        /// Query or function name.
        #[serde(skip_serializing_if = "Option::is_none")]
        query: Option<String>,
    },
    /// Identity failure.
    Authentication {
        /// Provider that failed.
        #[serde(skip_serializing_if = "Option::is_none")]
        provider: Option<AuthProvider>,
        /// Whether the user must sign in again.
        requires_reauth: bool,
    },
    /// Permission failure.
    Authorization {
        /// Resource being accessed.
        #[serde(skip_serializing_if = "Option::is_none")]
        resource: Option<String>,
        /// Action attempted.
        #[serde(skip_serializing_if = "Option::is_none")]
        action: Option<String>,
        /// Role that would have allowed it.
        #[serde(skip_serializing_if = "Option::is_none")]
        required_role: Option<String>,
    },
    /// Rejected or failed upload.
    FileUpload {
        /// Client-side file name.
        file_name: String,
        /// Actual size in bytes.
        #[serde(skip_serializing_if = "Option::is_none")]
        file_size: Option<u64>,
        /// MIME type.
        #[serde(skip_serializing_if = "Option::is_none")]
        file_type: Option<String>,
        /// Limit in bytes.
        #[serde(skip_serializing_if = "Option::is_none")]
        max_file_size: Option<u64>,
        /// Accepted MIME types.
        #[serde(skip_serializing_if = "Vec::is_empty")]
        allowed_types: Vec<String>,
    },
    /// No variant-specific data.
    #[serde(rename = "unknown")]
    Generic,
}

impl ErrorKind {
    /// Discriminator as written to logs.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Network { .. } => "network",
            Self::Validation { .. } => "validation",
            Self::Database { .. } => "database",
            Self::Authentication { .. } => "authentication",
            Self::Authorization { .. } => "authorization",
            Self::FileUpload { .. } => "file_upload",
            Self::Generic => "unknown",
        }
    }
}

// ============================================================================
// AppError
// ============================================================================

/// The single error type every failure is normalized into.
///
/// Construct through the factories in [`factory`](crate::factory) or
/// [`normalize_error`](crate::normalize_error).
#[derive(Clone)]
#[must_use = "errors should be handled, shown or logged"]
pub struct AppError {
    code: ErrorCode,
    message: Cow<'static, str>,
    title: Option<Cow<'static, str>>,
    severity: Severity,
    timestamp: u64,
    created_at: Instant,
    context: ErrorContext,
    stack: Option<Arc<str>>,
    original_error: Option<OriginalError>,
    kind: ErrorKind,
}

impl AppError {
    /// Base constructor. Title and message default from the static table.
    pub(crate) fn new(code: ErrorCode) -> Self {
        let template = definitions::message_for(code);
        Self {
            code,
            message: Cow::Borrowed(template.message),
            title: Some(Cow::Borrowed(template.title)),
            severity: Severity::Medium,
            timestamp: unix_millis(),
            created_at: Instant::now(),
            context: ErrorContext::new(),
            stack: None,
            original_error: None,
            kind: ErrorKind::Generic,
        }
    }

    #[inline]
    pub(crate) fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    #[inline]
    pub(crate) fn set_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach the causing error and capture a backtrace if the process has
    /// backtraces enabled.
    pub(crate) fn set_original(mut self, original: OriginalError) -> Self {
        let backtrace = Backtrace::capture();
        if backtrace.status() == BacktraceStatus::Captured {
            self.stack = Some(Arc::from(backtrace.to_string()));
        }
        self.original_error = Some(original);
        self
    }

    /// Override the severity.
    #[inline]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Merge one entry into the context.
    #[inline]
    pub fn with_context(
        mut self,
        key: impl Into<Cow<'static, str>>,
        value: impl Into<crate::ContextField>,
    ) -> Self {
        self.context.insert(key, value);
        self
    }

    /// Merge a whole bag into the context.
    #[inline]
    pub fn merge_context(&mut self, other: ErrorContext) {
        self.context.merge(other);
    }

    /// Error code.
    #[inline]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Display heading, if any.
    #[inline]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Severity.
    #[inline]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Creation time in milliseconds since the Unix epoch.
    #[inline]
    pub const fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Time elapsed since construction.
    #[inline]
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Diagnostic context.
    #[inline]
    pub const fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Captured backtrace, if one was taken.
    #[inline]
    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    /// The causing error, in-process only.
    #[inline]
    pub fn original_error(&self) -> Option<&OriginalError> {
        self.original_error.as_ref()
    }

    /// Variant payload.
    #[inline]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Serializable view without the causing error.
    pub fn info(&self) -> ErrorInfo<'_> {
        ErrorInfo {
            code: self.code,
            message: &self.message,
            title: self.title.as_deref(),
            severity: self.severity,
            timestamp: self.timestamp,
            kind: &self.kind,
            context: &self.context,
            stack: self.stack.as_deref(),
        }
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppError")
            .field("code", &self.code)
            .field("type", &self.kind.type_name())
            .field("message", &self.message)
            .field("severity", &self.severity)
            .field("timestamp", &self.timestamp)
            .field("kind", &self.kind)
            .field("context", &self.context)
            .field("original_error", &self.original_error.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl fmt::Display for AppError {
    /// Format: `"[{CODE}] {message}"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.original_error
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

/// Serializable snapshot of an [`AppError`] for logs and reports.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo<'a> {
    /// Error code.
    pub code: ErrorCode,
    /// Message.
    pub message: &'a str,
    /// Heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    /// Severity.
    pub severity: Severity,
    /// Creation time, ms since epoch.
    pub timestamp: u64,
    /// Variant payload, flattened so `type` sits at top level.
    #[serde(flatten)]
    pub kind: &'a ErrorKind,
    /// Context bag.
    pub context: &'a ErrorContext,
    /// Backtrace text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<&'a str>,
}

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// Thrown
// ============================================================================

/// Anything a failing call can produce, before normalization.
pub enum Thrown {
    /// Already normalized.
    App(AppError),
    /// A native error value.
    Exception(Box<dyn Error + Send + Sync + 'static>),
    /// A bare message.
    Message(String),
    /// Something with no usable detail.
    Opaque,
}

impl Thrown {
    /// Wrap a native error.
    pub fn exception(err: impl Error + Send + Sync + 'static) -> Self {
        Self::Exception(Box::new(err))
    }

    /// Convert a panic payload. String payloads keep their text; anything
    /// else becomes [`Thrown::Opaque`].
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<String>() {
            Ok(s) => Self::Message(*s),
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => Self::Message((*s).to_owned()),
                Err(_) => Self::Opaque,
            },
        }
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::App(e) => f.debug_tuple("App").field(e).finish(),
            Self::Exception(e) => f.debug_tuple("Exception").field(&e.to_string()).finish(),
            Self::Message(m) => f.debug_tuple("Message").field(m).finish(),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

impl From<AppError> for Thrown {
    fn from(value: AppError) -> Self {
        Self::App(value)
    }
}

impl From<String> for Thrown {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<&str> for Thrown {
    fn from(value: &str) -> Self {
        Self::Message(value.to_owned())
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for Thrown {
    fn from(value: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self::Exception(value)
    }
}

impl From<std::io::Error> for Thrown {
    fn from(value: std::io::Error) -> Self {
        Self::exception(value)
    }
}

impl From<serde_json::Error> for Thrown {
    fn from(value: serde_json::Error) -> Self {
        Self::exception(value)
    }
}
