//! # Hireline Errors
//!
//! One error model for every layer of the Hireline platform: HTTP calls,
//! reactive database operations, identity-provider failures and form input.
//!
//! ## Design Philosophy
//!
//! 1. **Every failure becomes an [`AppError`]** with a code from a closed taxonomy
//! 2. **Codes drive presentation**: title, message and suggested action come from one table
//! 3. **Retryability is a pure function** of the error value
//! 4. **Reporting never fails the caller**: sink errors are swallowed and traced
//! 5. **Context values are zeroized on drop**
//!
//! ## Quick Start
//!
//! ```rust
//! use hireline_errors::{create_network_error, get_error_message, is_retryable_error, ErrorCode};
//!
//! let err = create_network_error(503, Some("/api/jobs"), Some("GET"), None);
//! assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
//! assert!(is_retryable_error(&err));
//!
//! let copy = get_error_message(&err);
//! println!("{}: {}", copy.title, copy.message);
//! ```
//!
//! ## Normalizing Foreign Failures
//!
//! ```rust
//! use hireline_errors::{normalize_error, ErrorCode};
//!
//! let io = std::io::Error::other("fetch failed: connection reset");
//! assert_eq!(normalize_error(io).code(), ErrorCode::NetworkError);
//!
//! let plain = normalize_error("something odd");
//! assert_eq!(plain.code(), ErrorCode::UnknownError);
//! assert_eq!(plain.message(), "something odd");
//! ```
//!
//! ## Modules
//!
//! - [`retry`]: backoff loop over any async operation
//! - [`debounce`]: per-key report suppression
//! - [`logging`]: error log, breadcrumbs and production reports
//! - [`toast`]: user-facing notifications through a pluggable sink
//! - [`auth`], [`database`], [`api`], [`validation`]: boundary wrappers
//!
//! ## Features
//!
//! - `tokio` (default): backoff sleeps and request timeouts on tokio
//! - `async_std`: backoff sleeps on async-std

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codes;
pub mod context;
pub mod definitions;
pub mod models;
pub mod factory;
pub mod classify;
#[cfg(any(feature = "tokio", feature = "async_std"))]
pub mod retry;
pub mod debounce;
pub mod ring_buffer;
pub mod config;
pub mod logging;
pub mod toast;
pub mod auth;
pub mod database;
#[cfg(feature = "tokio")]
pub mod api;
pub mod validation;

pub use classify::*;
pub use codes::*;
pub use context::*;
pub use factory::*;
pub use models::*;

/// Type alias for Results using our error type.
pub type Result<T> = std::result::Result<T, AppError>;
