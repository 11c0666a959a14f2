//! Test utilities for Soopay.
//!
//! - Deterministic-per-process RSA fixtures for the merchant and the gateway
//! - A gateway simulator that signs responses and checks merchant signatures
//! - A recording mock transport
//!
//! ## Usage
//!
//! ```rust,ignore
//! use soopay_lib::test_utils::{GatewaySimulator, MockTransport, gateway_keys, merchant_keys};
//!
//! let gateway = GatewaySimulator::new();
//! let transport = Arc::new(MockTransport::html(gateway.respond_html(&fields)));
//! let client = Client::builder(ClientConfig::new("M1"))
//!     .private_key(merchant_keys().0.clone())
//!     .public_key(gateway_keys().1.clone())
//!     .transport(transport)
//!     .build()?;
//! ```

mod fixtures;
mod gateway;
mod mock_transport;

pub use fixtures::{gateway_keys, merchant_keys, merchant_rsa_key};
pub use gateway::GatewaySimulator;
pub use mock_transport::MockTransport;
