//! Soopay mobile payment gateway client.
//!
//! The gateway speaks form-encoded requests and answers with a signed query
//! string inside an HTML `<meta>` tag. This crate implements the signing
//! protocol around that exchange:
//!
//! - **Canonical parameters**: [`Params`] sorts keys byte-wise so both sides
//!   sign the same string
//! - **RSA**: PKCS#1 v1.5 sign/verify and encrypt/decrypt ([`crypto`])
//! - **Protocol paths**: request building, response verification and
//!   notification replies ([`protocol`])
//! - **Client**: the build → sign → send → parse → verify cycle ([`Client`])
//!
//! # Example
//!
//! ```ignore
//! use soopay_lib::{Client, ClientConfig, Params};
//! use soopay_lib::crypto::{load_private_key_from_pfx_file, load_public_key_from_file};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = Client::builder(ClientConfig::new("60000100"))
//!     .private_key(load_private_key_from_pfx_file("merchant.p12", "password")?)
//!     .public_key(load_public_key_from_file("gateway.crt")?)
//!     .build()?;
//!
//! let mut data = Params::new();
//! data.set("order_id", "A001").set("mer_date", "20240101");
//! let result = client.execute(&CancellationToken::new(), "mer_order_info_query", &mut data).await?;
//! ```

pub mod charset;
pub mod client;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod log;
pub mod params;
pub mod prelude;
pub mod protocol;
pub mod transport;

/// Test utilities for gateway testing.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use errors::{KeyError, KeyKind, SoopayError, SoopayErrorCode};
pub use params::{EmptyMode, EncodeOptions, Params};

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, SoopayError>;
