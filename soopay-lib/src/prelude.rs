//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use soopay_lib::prelude::*;
//! ```

// Client
pub use crate::client::{Client, ClientBuilder};
pub use crate::config::ClientConfig;

// Error handling
pub use crate::errors::{KeyError, KeyKind, SoopayError, SoopayErrorCode};
pub use crate::Result;

// Parameters
pub use crate::params::{EmptyMode, EncodeOptions, Params, RET_CODE_OK};

// Keys
pub use crate::crypto::{
    load_private_key_from_pem_file, load_private_key_from_pfx_file, load_public_key_from_file,
    DigestAlgorithm, PrivateKey, PublicKey,
};

// Transport
pub use crate::transport::{HttpOptions, HttpTransport};

// Logging
pub use crate::log::{LogHook, RequestLog};

pub use tokio_util::sync::CancellationToken;
