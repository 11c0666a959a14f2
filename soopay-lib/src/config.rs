//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::{Result, SoopayError};

/// Production gateway endpoint.
pub const DEFAULT_GATEWAY_URL: &str = "https://pay.soopay.net/spay/pay/payservice.do";

/// Merchant account and HTTP settings for a [`crate::Client`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Merchant identifier (`mer_id`).
    pub merchant_id: String,

    /// Gateway endpoint URL.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// TCP connect timeout in seconds.
    #[serde(default = "default_timeout")]
    pub connect_timeout_secs: u64,

    /// How long an idle pooled connection is kept, in seconds.
    #[serde(default = "default_pool_idle_timeout")]
    pub pool_idle_timeout_secs: u64,

    /// Maximum idle connections kept per host.
    #[serde(default = "default_pool_max_idle_per_host")]
    pub pool_max_idle_per_host: usize,

    /// Skip TLS certificate validation. Only for gateway test environments.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_pool_idle_timeout() -> u64 {
    60
}

fn default_pool_max_idle_per_host() -> usize {
    1000
}

impl ClientConfig {
    /// Create a configuration for the production gateway.
    pub fn new(merchant_id: impl Into<String>) -> Self {
        Self {
            merchant_id: merchant_id.into(),
            gateway_url: default_gateway_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_timeout(),
            pool_idle_timeout_secs: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle_per_host(),
            accept_invalid_certs: false,
        }
    }

    /// Load from `SOOPAY_MERCHANT_ID`, `SOOPAY_GATEWAY_URL` and
    /// `SOOPAY_TIMEOUT_SECS`. Only the merchant id is required.
    pub fn from_env() -> Result<Self> {
        let merchant_id = std::env::var("SOOPAY_MERCHANT_ID")
            .map_err(|_| SoopayError::invalid_data("SOOPAY_MERCHANT_ID", "not set"))?;

        let mut config = Self::new(merchant_id);

        if let Ok(url) = std::env::var("SOOPAY_GATEWAY_URL") {
            config = config.with_gateway_url(url);
        }
        if let Ok(secs) = std::env::var("SOOPAY_TIMEOUT_SECS") {
            let secs = secs
                .parse()
                .map_err(|_| SoopayError::invalid_data("SOOPAY_TIMEOUT_SECS", secs.clone()))?;
            config = config.with_timeout(secs);
        }

        Ok(config)
    }

    /// Set the gateway endpoint.
    pub fn with_gateway_url(mut self, url: impl Into<String>) -> Self {
        self.gateway_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    /// Skip TLS certificate validation.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_id.is_empty() {
            return Err(SoopayError::invalid_data(
                "merchant_id",
                "merchant id cannot be empty",
            ));
        }
        if self.gateway_url.is_empty() {
            return Err(SoopayError::invalid_data(
                "gateway_url",
                "gateway URL cannot be empty",
            ));
        }
        Ok(())
    }
}
