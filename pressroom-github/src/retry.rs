//! Retry-with-backoff wrapper around a transport.
//!
//! ```text
//! pending ─┬─ 2xx ─────────────────────────────▶ success
//!          ├─ 4xx ─────────────────────────────▶ failed (Api, no retry)
//!          └─ 5xx / other / network ─┬─ budget left ─ sleep ─▶ pending
//!                                    └─ exhausted ───────────▶ failed
//! ```

use std::time::Duration;

use pressroom_core::RetrySettings;
use serde::Deserialize;

use crate::error::RemoteError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt + 1`: `base_delay * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay: settings.base_delay,
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Send `request`, retrying server and network failures.
///
/// Client errors (400–499) fail immediately with the API's own message.
pub fn fetch_with_retry(
    transport: &dyn HttpTransport,
    request: &HttpRequest,
    policy: &RetryPolicy,
) -> Result<HttpResponse, RemoteError> {
    let mut attempt = 0;
    loop {
        match transport.send(request) {
            Ok(response) if response.is_success() => return Ok(response),
            Ok(response) if response.is_client_error() => {
                return Err(RemoteError::Api {
                    status: response.status,
                    message: api_message(&response),
                });
            }
            Ok(response) => {
                if attempt >= policy.max_retries {
                    return Err(RemoteError::Http {
                        status: response.status,
                        status_text: response.status_text,
                    });
                }
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status,
                    attempt,
                    "retrying after server error"
                );
            }
            Err(err) => {
                if attempt >= policy.max_retries {
                    return Err(RemoteError::Network(err.0));
                }
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    error = %err,
                    attempt,
                    "retrying after network error"
                );
            }
        }
        std::thread::sleep(policy.delay_for(attempt));
        attempt += 1;
    }
}

/// `message` from a JSON error body, else the status text.
fn api_message(response: &HttpResponse) -> String {
    serde_json::from_str::<ApiErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if response.status_text.is_empty() {
                format!("HTTP {}", response.status)
            } else {
                response.status_text.clone()
            }
        })
}
