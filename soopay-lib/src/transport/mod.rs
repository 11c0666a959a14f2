//! HTTP transport abstraction.
//!
//! The client only needs "send these bytes, give me status, headers and
//! body". [`HttpTransport`] is the seam; [`ReqwestTransport`] is the
//! default implementation behind the `http-transport` feature.

#[cfg(feature = "http-transport")]
mod http_client;
mod traits;

#[cfg(feature = "http-transport")]
pub use http_client::ReqwestTransport;
pub use traits::{HttpOptions, HttpRequest, HttpResponse, HttpTransport};
