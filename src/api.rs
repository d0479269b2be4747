//! HTTP client wrapper that turns every failure into an [`AppError`].
//!
//! The wire itself is abstracted behind [`HttpTransport`]; [`ApiClient`] adds
//! per-request timeouts, status mapping, body parsing, optional retries and
//! logging on top. Results always come back inside an [`ApiResponse`] so the
//! request id and timing survive both outcomes.
//!
//! # Failure mapping
//!
//! | Condition               | Error                                       |
//! |-------------------------|---------------------------------------------|
//! | transport error         | network error, status `0`                   |
//! | timeout elapsed         | network error, status `408`                 |
//! | non-2xx status          | network error for that status               |
//! | body does not parse     | validation error on field `response`        |

use crate::classify::{is_retryable_error, normalize_error, prefixed_id};
use crate::factory::{create_network_error, create_validation_error};
use crate::logging::ErrorLogger;
use crate::models::{AppError, unix_millis};
use crate::retry::{RetryOptions, retry_operation};
use crate::ErrorContext;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Error type transports report.
pub type TransportError = Box<dyn Error + Send + Sync + 'static>;

// ============================================================================
// Wire types
// ============================================================================

/// Request verb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case verb.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing request handed to the transport.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Absolute or base-relative URL.
    pub url: String,
    /// Header pairs in send order.
    pub headers: Vec<(String, String)>,
    /// Serialized body.
    pub body: Option<String>,
}

/// What came back from the transport.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    /// HTTP status.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// Raw body.
    pub body: String,
}

impl RawResponse {
    /// Whether the status is 2xx.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// Something that can put an [`ApiRequest`] on the wire.
pub trait HttpTransport: Send + Sync {
    /// Send one request. Non-2xx statuses are responses, not errors.
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

// ============================================================================
// Client
// ============================================================================

/// Per-request knobs.
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Time allowed for one attempt.
    pub timeout: Duration,
    /// Extra attempts after the first. Zero disables retrying.
    pub retries: u32,
    /// Base delay between attempts.
    pub retry_delay: Duration,
    /// Keys added to the context of a final failure.
    pub metadata: ErrorContext,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 0,
            retry_delay: Duration::from_secs(1),
            metadata: ErrorContext::new(),
        }
    }
}

/// Bookkeeping attached to every response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    /// `req_<millis>_<suffix>`.
    pub request_id: String,
    /// Start time, ms since epoch.
    pub timestamp: u64,
    /// Wall time across all attempts.
    pub duration: Duration,
}

/// Outcome of [`ApiClient::request`].
#[derive(Debug)]
pub struct ApiResponse<R> {
    /// Parsed body or the final error.
    pub result: Result<R, AppError>,
    /// Request bookkeeping.
    pub meta: ResponseMeta,
}

impl<R> ApiResponse<R> {
    /// Drop the metadata.
    #[inline]
    pub fn into_result(self) -> Result<R, AppError> {
        self.result
    }
}

/// HTTP client over a pluggable transport.
#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: Arc<T>,
    logger: ErrorLogger,
}

impl<T: HttpTransport> ApiClient<T> {
    /// Client sending through `transport` and logging to `logger`.
    pub fn new(transport: T, logger: ErrorLogger) -> Self {
        Self {
            transport: Arc::new(transport),
            logger,
        }
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request`, retrying per `config`, and parse the body as `R`.
    pub async fn request<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        config: RequestConfig,
    ) -> ApiResponse<R> {
        let request_id = prefixed_id("req");
        let timestamp = unix_millis();
        let started = Instant::now();

        let retries = config.retries;
        let logger = self.logger.clone();
        let retry_request_id = request_id.clone();
        let retry_url = request.url.clone();
        let options = RetryOptions::new()
            .max_attempts(retries.saturating_add(1))
            .delay(config.retry_delay)
            .should_retry(move |error| retries > 0 && is_retryable_error(error))
            .on_retry(move |attempt, error| {
                logger.log(
                    error,
                    Some(
                        ErrorContext::new()
                            .with("component", "ApiRequest")
                            .with("operation", "retry")
                            .with("attempt", attempt)
                            .with("requestId", retry_request_id.clone())
                            .with("url", retry_url.clone()),
                    ),
                );
            });

        let this = self;
        let outgoing = &request;
        let timeout = config.timeout;
        let result = retry_operation(move || this.attempt::<R>(outgoing.clone(), timeout), options).await;
        let duration = started.elapsed();

        let result = result.map_err(|mut error| {
            error.merge_context(
                ErrorContext::new()
                    .with("url", request.url.clone())
                    .with("method", request.method.as_str())
                    .with("requestId", request_id.clone())
                    .with("duration", duration.as_millis() as u64),
            );
            error.merge_context(config.metadata.clone());
            self.logger.log(
                &error,
                Some(
                    ErrorContext::new()
                        .with("component", "ApiClient")
                        .with("operation", "request")
                        .with("requestId", request_id.clone()),
                ),
            );
            error
        });

        ApiResponse {
            result,
            meta: ResponseMeta {
                request_id,
                timestamp,
                duration,
            },
        }
    }

    /// `GET url`.
    pub async fn get<R: DeserializeOwned>(&self, url: &str, config: Option<RequestConfig>) -> ApiResponse<R> {
        self.request(bare(HttpMethod::Get, url), config.unwrap_or_default()).await
    }

    /// `POST url` with a JSON body.
    pub async fn post<R: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        config: Option<RequestConfig>,
    ) -> ApiResponse<R> {
        self.with_body(HttpMethod::Post, url, body, config).await
    }

    /// `PUT url` with a JSON body.
    pub async fn put<R: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        config: Option<RequestConfig>,
    ) -> ApiResponse<R> {
        self.with_body(HttpMethod::Put, url, body, config).await
    }

    /// `PATCH url` with a JSON body.
    pub async fn patch<R: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        config: Option<RequestConfig>,
    ) -> ApiResponse<R> {
        self.with_body(HttpMethod::Patch, url, body, config).await
    }

    /// `DELETE url`.
    pub async fn delete<R: DeserializeOwned>(&self, url: &str, config: Option<RequestConfig>) -> ApiResponse<R> {
        self.request(bare(HttpMethod::Delete, url), config.unwrap_or_default()).await
    }

    async fn with_body<R: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: &str,
        body: &B,
        config: Option<RequestConfig>,
    ) -> ApiResponse<R> {
        match serde_json::to_string(body) {
            Ok(json) => {
                let mut request = bare(method, url);
                request
                    .headers
                    .push(("Content-Type".to_owned(), "application/json".to_owned()));
                request.body = Some(json);
                self.request(request, config.unwrap_or_default()).await
            }
            Err(e) => ApiResponse {
                result: Err(normalize_error(e)),
                meta: ResponseMeta {
                    request_id: prefixed_id("req"),
                    timestamp: unix_millis(),
                    duration: Duration::ZERO,
                },
            },
        }
    }

    async fn attempt<R: DeserializeOwned>(&self, request: ApiRequest, timeout: Duration) -> Result<R, AppError> {
        let url = request.url.clone();
        let method = request.method;

        let response = match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Err(_) => return Err(create_network_error(408, Some(&url), Some(method.as_str()), None)),
            Ok(Err(e)) => {
                return Err(create_network_error(0, Some(&url), Some(method.as_str()), Some(Arc::from(e))));
            }
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(
                create_network_error(response.status, Some(&url), Some(method.as_str()), None)
                    .with_context("responseMessage", response_message(&response)),
            );
        }
        parse_body(&response)
    }
}

fn bare(method: HttpMethod, url: &str) -> ApiRequest {
    ApiRequest {
        method,
        url: url.to_owned(),
        ..ApiRequest::default()
    }
}

/// `message` or `error` from a JSON error body, else the reason phrase.
fn response_message(response: &RawResponse) -> String {
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| {
            ["message", "error"]
                .iter()
                .find_map(|key| body.get(*key).and_then(Value::as_str).map(str::to_owned))
        })
        .unwrap_or_else(|| response.status_text.clone())
}

fn parse_body<R: DeserializeOwned>(response: &RawResponse) -> Result<R, AppError> {
    let parsed = if response.body.trim().is_empty() {
        serde_json::from_value(Value::Null)
    } else if response.is_json() {
        serde_json::from_str(&response.body)
    } else {
        serde_json::from_value(Value::String(response.body.clone()))
    };
    parsed.map_err(|e| {
        create_validation_error("response", "Invalid JSON response", None, None).set_original(Arc::new(e))
    })
}
