//! HTTP transport abstraction.
//!
//! [`RepoClient`](crate::RepoClient) talks to the API only through
//! [`HttpTransport`], so tests can swap in a scripted transport.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<String>,
}

/// Status and body of a completed exchange, whatever the status class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// The request never produced a response (DNS, connect, TLS, timeout, ...).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends one request and returns the response, including 4xx/5xx ones.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl HttpTransport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }
        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };
        match result {
            Ok(response) => into_response(response),
            // ureq reports 4xx/5xx as errors; the retry layer wants them as data.
            Err(ureq::Error::Status(_, response)) => into_response(response),
            Err(ureq::Error::Transport(err)) => Err(TransportError(err.to_string())),
        }
    }
}

fn into_response(response: ureq::Response) -> Result<HttpResponse, TransportError> {
    let status = response.status();
    let status_text = response.status_text().to_string();
    let body = response
        .into_string()
        .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
    Ok(HttpResponse {
        status,
        status_text,
        body,
    })
}
