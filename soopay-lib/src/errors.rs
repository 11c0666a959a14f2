//! Error types for Soopay operations.
//!
//! Every failure in the signing and verification path is returned to the
//! caller unchanged. Nothing here is recovered locally, and no partial
//! result survives a verification failure.

use std::fmt;

/// Which half of the RSA key pair an operation needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// The merchant private key (sign, decrypt).
    Private,
    /// The gateway public key (verify, encrypt).
    Public,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Private => write!(f, "private key"),
            Self::Public => write!(f, "public key"),
        }
    }
}

/// Error codes for FFI and mobile integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SoopayErrorCode {
    /// Required key not configured
    KeyMissing = 1000,
    /// Key material could not be loaded
    KeyLoad = 1001,
    /// RSA primitive failed
    Crypto = 2000,
    /// Signature did not match
    SignatureInvalid = 2001,
    /// Response structure was not as expected
    MalformedResponse = 3000,
    /// Invalid request data
    InvalidData = 3001,
    /// Text transcoding failed
    Charset = 3002,
    /// Transport/network layer error
    Transport = 4000,
    /// Gateway answered with a non-200 status
    HttpStatus = 4001,
    /// Request timed out
    Timeout = 4002,
    /// Caller cancelled the request
    Cancelled = 4003,
}

/// Error type for Soopay operations.
#[derive(Debug)]
pub enum SoopayError {
    /// An operation needed a key the client was not configured with.
    KeyMissing {
        /// The missing key
        key: KeyKind,
    },

    /// Loading key material from a store, PEM or certificate failed.
    KeyLoad(KeyError),

    /// The underlying sign/encrypt/decrypt primitive failed.
    Crypto(String),

    /// Verification completed but the signature did not match.
    ///
    /// The whole response must be treated as untrusted.
    SignatureInvalid,

    /// The response did not carry the expected payload.
    MalformedResponse(String),

    /// Invalid data supplied by the caller.
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Decrypted text could not be transcoded.
    Charset(String),

    /// Transport/network layer error.
    Transport(String),

    /// The gateway answered with a status other than 200.
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// The request timed out inside the transport.
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// The caller's cancellation token fired while the request was in flight.
    Cancelled,
}

impl SoopayError {
    /// Get the error code for FFI/mobile integration.
    pub fn code(&self) -> SoopayErrorCode {
        match self {
            Self::KeyMissing { .. } => SoopayErrorCode::KeyMissing,
            Self::KeyLoad(_) => SoopayErrorCode::KeyLoad,
            Self::Crypto(_) => SoopayErrorCode::Crypto,
            Self::SignatureInvalid => SoopayErrorCode::SignatureInvalid,
            Self::MalformedResponse(_) => SoopayErrorCode::MalformedResponse,
            Self::InvalidData { .. } => SoopayErrorCode::InvalidData,
            Self::Charset(_) => SoopayErrorCode::Charset,
            Self::Transport(_) => SoopayErrorCode::Transport,
            Self::HttpStatus { .. } => SoopayErrorCode::HttpStatus,
            Self::Timeout { .. } => SoopayErrorCode::Timeout,
            Self::Cancelled => SoopayErrorCode::Cancelled,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true for every failure of the network round trip,
    /// cancellation included.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::HttpStatus { .. } | Self::Timeout { .. } | Self::Cancelled
        )
    }

    /// Returns true if the caller may reasonably retry.
    ///
    /// The client never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::HttpStatus { status } => *status >= 500,
            _ => false,
        }
    }

    /// Create a key missing error.
    pub fn key_missing(key: KeyKind) -> Self {
        Self::KeyMissing { key }
    }

    /// Create a transport error from any error type.
    pub fn transport<E: std::error::Error>(err: E) -> Self {
        Self::Transport(err.to_string())
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SoopayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyMissing { key } => write!(f, "{} is not configured", key),
            Self::KeyLoad(err) => write!(f, "key load error: {}", err),
            Self::Crypto(msg) => write!(f, "crypto error: {}", msg),
            Self::SignatureInvalid => write!(f, "signature verification failed"),
            Self::MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            Self::InvalidData { field, reason } => write!(f, "invalid {}: {}", field, reason),
            Self::Charset(msg) => write!(f, "charset error: {}", msg),
            Self::Transport(msg) => write!(f, "transport error: {}", msg),
            Self::HttpStatus { status } => {
                write!(f, "HTTP request error, status code = {}", status)
            }
            Self::Timeout { timeout_ms } => write!(f, "request timed out after {}ms", timeout_ms),
            Self::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for SoopayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::KeyLoad(err) => Some(err),
            _ => None,
        }
    }
}

/// Key loading error types.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid PKCS#12 store: {0}")]
    Pkcs12(String),
    #[error("PKCS#12 store contains no private key")]
    NoPrivateKey,
    #[error("invalid private key: {0}")]
    PrivateKey(String),
    #[error("invalid public key: {0}")]
    PublicKey(String),
    #[error("invalid certificate: {0}")]
    Certificate(String),
    #[error("unsupported PEM block: {0}")]
    UnsupportedPem(String),
}

impl From<KeyError> for SoopayError {
    fn from(err: KeyError) -> Self {
        Self::KeyLoad(err)
    }
}

impl From<base64::DecodeError> for SoopayError {
    fn from(err: base64::DecodeError) -> Self {
        Self::invalid_data("base64", err.to_string())
    }
}
