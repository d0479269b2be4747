//! Retrying a flaky backend through the API client.
//!
//! Run with `RUST_LOG=debug cargo run --example retry_fetch` to see every
//! attempt and backoff wait.

use hireline_errors::api::{ApiClient, ApiRequest, HttpTransport, RawResponse, RequestConfig, TransportError};
use hireline_errors::config::{ErrorKitConfig, RuntimeMode};
use hireline_errors::logging::ErrorLogger;
use hireline_errors::retry::{retry_operation, RetryOptions};
use hireline_errors::{create_network_error, get_error_message};
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Fails with 503 for the first `failures` calls.
struct RecoveringBackend {
    failures: u32,
    calls: AtomicU32,
}

impl HttpTransport for RecoveringBackend {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<RawResponse, TransportError>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failures = self.failures;
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            println!("   -> {} {} (call {call})", request.method, request.url);
            if call <= failures {
                Ok(RawResponse {
                    status: 503,
                    status_text: "Service Unavailable".into(),
                    content_type: Some("application/json".into()),
                    body: r#"{"message":"warming up"}"#.into(),
                })
            } else {
                Ok(RawResponse {
                    status: 200,
                    status_text: "OK".into(),
                    content_type: Some("application/json".into()),
                    body: r#"["Platform engineer","Data analyst"]"#.into(),
                })
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("--- Retry Example ---\n");

    // 1. Bare retry loop around any async operation.
    println!("1. [RETRY OPERATION]");
    let counter = AtomicU32::new(0);
    let attempts = &counter;
    let outcome = retry_operation(
        move || async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(create_network_error(502, Some("/api/health"), Some("GET"), None))
            } else {
                Ok(n)
            }
        },
        RetryOptions::new()
            .delay(Duration::from_millis(50))
            .on_retry(|attempt, err| println!("   attempt {attempt} failed with {}", err.code())),
    )
    .await;
    match outcome {
        Ok(n) => println!("   healthy after {n} attempts"),
        Err(err) => println!("   gave up: {err}"),
    }

    // 2. The API client retries retryable statuses when asked to.
    println!("\n2. [API CLIENT]");
    let logger = ErrorLogger::new(ErrorKitConfig::default().with_mode(RuntimeMode::Development));
    let client = ApiClient::new(
        RecoveringBackend {
            failures: 2,
            calls: AtomicU32::new(0),
        },
        logger.clone(),
    );
    let config = RequestConfig {
        retries: 3,
        retry_delay: Duration::from_millis(100),
        ..RequestConfig::default()
    };
    let response = client.get::<Vec<String>>("/api/jobs", Some(config)).await;
    println!("   request {} took {:?}", response.meta.request_id, response.meta.duration);
    match response.result {
        Ok(jobs) => println!("   jobs: {}", jobs.join(", ")),
        Err(err) => {
            let copy = get_error_message(&err);
            println!("   {}: {}", copy.title, copy.message);
        }
    }
    println!("   retries logged: {}", logger.logs().len());

    // 3. Without retries the first 503 is final.
    println!("\n3. [NO RETRIES]");
    let strict = ApiClient::new(
        RecoveringBackend {
            failures: 1,
            calls: AtomicU32::new(0),
        },
        logger,
    );
    if let Err(err) = strict.get::<Vec<String>>("/api/jobs", None).await.into_result() {
        println!(
            "   {} (server said: {})",
            err.code(),
            err.context().get("responseMessage").unwrap_or("-")
        );
    }
}
