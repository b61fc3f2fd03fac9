//! Wire-level request/response types and the transport boundary
//!
//! The dispatcher never talks HTTP itself. It builds a [`WireRequest`],
//! runs it through the configured [`RequestFilter`]s and hands it to a
//! [`Transport`]. [`HttpTransport`] is the production implementation on
//! top of a pooled `reqwest::Client`.

use crate::error::{CloudError, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::time::Duration;

/// HTTP verb of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body with its media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Payload {
    pub fn new(content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// A concrete request, built fresh for each invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub verb: Verb,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub payload: Option<Payload>,
}

impl WireRequest {
    pub fn new(verb: Verb, uri: impl Into<String>) -> Self {
        Self {
            verb,
            uri: uri.into(),
            headers: Vec::new(),
            payload: None,
        }
    }

    /// Set a header, replacing any previous value of the same name
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A response whose body has been read in full
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// JSON response with the given status
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body(value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Executes wire requests against a provider
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse>;
}

/// Mutates a request right before it is sent (authentication, tokens)
pub trait RequestFilter: Send + Sync {
    fn filter(&self, request: WireRequest) -> Result<WireRequest>;
}

/// Adds an HTTP Basic `Authorization` header
pub struct BasicAuthFilter {
    header: String,
}

impl BasicAuthFilter {
    pub fn new(user: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{}:{}", user, password));
        Self {
            header: format!("Basic {}", encoded),
        }
    }
}

impl RequestFilter for BasicAuthFilter {
    fn filter(&self, request: WireRequest) -> Result<WireRequest> {
        Ok(request.with_header("Authorization", self.header.clone()))
    }
}

/// Adds a session cookie, e.g. `vcloud-token=...`
pub struct CookieFilter {
    cookie: String,
}

impl CookieFilter {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            cookie: format!("{}={}", name, value),
        }
    }
}

impl RequestFilter for CookieFilter {
    fn filter(&self, request: WireRequest) -> Result<WireRequest> {
        Ok(request.with_header("Cookie", self.cookie.clone()))
    }
}

/// HTTP(S) transport on a shared, pooled `reqwest::Client`
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(60))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CloudError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Reuse an existing client (and its connection pool)
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> Result<WireResponse> {
        let method = match request.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Post => reqwest::Method::POST,
            Verb::Put => reqwest::Method::PUT,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let target = request.uri.clone();
        let transport_error = |e: reqwest::Error| CloudError::transport(target.clone(), e.to_string());

        let mut builder = self.client.request(method, &request.uri);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = request.payload {
            builder = builder
                .header("Content-Type", payload.content_type)
                .body(payload.data);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        // Drain the body so the connection goes back to the pool
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

/// Scripted transport for tests
#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Replays canned responses keyed by verb and URI, recording every
    /// request it sees. A route with several queued responses serves them
    /// in order and keeps repeating the last one. Unknown routes get 404.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<HashMap<(Verb, String), VecDeque<Result<WireResponse>>>>,
        requests: Mutex<Vec<WireRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue a response for `verb uri`
        pub fn on(&self, verb: Verb, uri: impl Into<String>, response: WireResponse) -> &Self {
            self.push(verb, uri.into(), Ok(response));
            self
        }

        /// Queue a transport-level failure for `verb uri`
        pub fn fail(&self, verb: Verb, uri: impl Into<String>, message: &str) -> &Self {
            let uri = uri.into();
            let error = CloudError::transport(uri.clone(), message);
            self.push(verb, uri, Err(error));
            self
        }

        fn push(&self, verb: Verb, uri: String, response: Result<WireResponse>) {
            self.routes
                .lock()
                .unwrap()
                .entry((verb, uri))
                .or_default()
                .push_back(response);
        }

        /// All requests executed so far, in order
        pub fn requests(&self) -> Vec<WireRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Number of requests sent to `verb uri`
        pub fn count(&self, verb: Verb, uri: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.verb == verb && r.uri == uri)
                .count()
        }
    }

    fn replay(entry: &Result<WireResponse>) -> Result<WireResponse> {
        match entry {
            Ok(response) => Ok(response.clone()),
            Err(CloudError::Transport { target, message, .. }) => {
                Err(CloudError::transport(target.clone(), message.clone()))
            }
            Err(other) => Err(CloudError::InvalidConfig(other.to_string())),
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn execute(&self, request: WireRequest) -> Result<WireResponse> {
            let key = (request.verb, request.uri.clone());
            self.requests.lock().unwrap().push(request);

            let mut routes = self.routes.lock().unwrap();
            let Some(queue) = routes.get_mut(&key) else {
                return Ok(WireResponse::new(404));
            };
            if queue.len() > 1 {
                if let Some(entry) = queue.pop_front() {
                    return replay(&entry);
                }
            }
            queue.front().map_or(Ok(WireResponse::new(404)), replay)
        }
    }
}
