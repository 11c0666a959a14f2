//! reqwest-backed gateway transport.

use std::time::Duration;

use async_trait::async_trait;

use super::traits::{HttpRequest, HttpResponse, HttpTransport};
use crate::config::ClientConfig;
use crate::{Result, SoopayError};

/// Transport built on a pooled `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    /// Build a transport with pool and timeout settings from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .tcp_keepalive(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| SoopayError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_ms: config.timeout_secs.saturating_mul(1000),
        })
    }

    /// Wrap an existing client.
    ///
    /// `timeout` is the request timeout `client` was built with, reported in
    /// [`SoopayError::Timeout`].
    pub fn with_client(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn map_reqwest_error(&self, e: reqwest::Error) -> SoopayError {
        if e.is_timeout() {
            SoopayError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            SoopayError::transport(e)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| SoopayError::invalid_data("method", e.to_string()))?;

        let mut builder = self.client.request(method, &request.url);

        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = request.options.cookie_header() {
            builder = builder.header(reqwest::header::COOKIE, cookie);
        }
        if request.options.close {
            builder = builder.header(reqwest::header::CONNECTION, "close");
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
