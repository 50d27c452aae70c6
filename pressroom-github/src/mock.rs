//! Scripted in-memory transport.
//!
//! Replies are queued per `(method, path)`; the last queued reply repeats.
//! Unscripted routes answer `404 {"message":"Not Found"}`, which is also how
//! a missing file looks to an existence check.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    Status(u16, String),
    NetworkError(String),
}

impl MockReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        MockReply::Status(status, body.to_string())
    }
}

#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockReply>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every request for `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Queue `reply` for `method path` (path only, no query string).
    pub fn on(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    /// Every request seen so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests seen for `method path`.
    pub fn requests_to(&self, method: Method, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && path_of(&r.url) == path)
            .collect()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// Highest number of concurrently outstanding requests observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, method: Method, path: &str) -> MockReply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&(method, path.to_string())) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => MockReply::Status(404, r#"{"message":"Not Found"}"#.to_string()),
        }
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        let reply = self.next_reply(request.method, &path_of(&request.url));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match reply {
            MockReply::Status(status, body) => Ok(HttpResponse {
                status,
                status_text: String::new(),
                body,
            }),
            MockReply::NetworkError(message) => Err(TransportError(message)),
        }
    }
}

fn path_of(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split('?').next().unwrap_or(url).to_string(),
    }
}
