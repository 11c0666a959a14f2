//! RSA keys and key loading.
//!
//! A client holds its own private key and the gateway's public key, never
//! the reverse. Either may be absent; operations needing a missing key fail
//! with [`crate::SoopayError::KeyMissing`] at the client layer.

mod keys;
mod loader;

pub use keys::{DigestAlgorithm, PrivateKey, PublicKey};
pub use loader::{
    load_private_key_from_pem_file, load_private_key_from_pfx_file, load_public_key_from_file,
};
