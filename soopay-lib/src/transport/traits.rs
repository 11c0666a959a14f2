use async_trait::async_trait;

use crate::Result;

/// Per-request HTTP options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpOptions {
    /// Request headers, in order. Repeated names are sent repeatedly.
    pub headers: Vec<(String, String)>,
    /// Cookies as name/value pairs.
    pub cookies: Vec<(String, String)>,
    /// Close the connection after the response instead of returning it to the pool.
    pub close: bool,
}

impl HttpOptions {
    /// Options with no headers or cookies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any earlier values for `name`.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Add a header value, keeping earlier values for `name`.
    pub fn append_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Close the connection after use.
    pub fn close(mut self) -> Self {
        self.close = true;
        self
    }

    /// Whether a header named `name` is present (case-insensitive).
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// Cookies rendered as a single `Cookie` header value.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(n, v)| format!("{}={}", n, v))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// An outbound HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub body: Vec<u8>,
    pub options: HttpOptions,
}

/// A gateway HTTP response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// HTTP transport used to reach the gateway.
///
/// Implementations perform exactly one attempt; retry policy belongs to the
/// caller. Cancellation is handled by [`crate::Client`], which drops the
/// `send` future when the caller's token fires.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and read the whole response body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}
