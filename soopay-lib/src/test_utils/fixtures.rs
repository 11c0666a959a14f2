//! RSA key fixtures.
//!
//! Keys are generated once per test process. 1024 bits keeps debug-build
//! generation fast and is plenty for exercising the protocol.

use std::sync::OnceLock;

use rsa::RsaPrivateKey;

use crate::crypto::{PrivateKey, PublicKey};

const FIXTURE_BITS: usize = 1024;

fn generate() -> RsaPrivateKey {
    let mut rng = rand::thread_rng();
    RsaPrivateKey::new(&mut rng, FIXTURE_BITS).expect("fixture key generation")
}

/// Raw merchant key, for tests exercising PEM/PKCS#12 encodings.
pub fn merchant_rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

/// Merchant key pair: the client's own private key and its public half.
pub fn merchant_keys() -> &'static (PrivateKey, PublicKey) {
    static KEYS: OnceLock<(PrivateKey, PublicKey)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private = PrivateKey::from(merchant_rsa_key().clone());
        let public = private.public_key();
        (private, public)
    })
}

/// Gateway key pair: signs responses; the client holds only the public half.
pub fn gateway_keys() -> &'static (PrivateKey, PublicKey) {
    static KEYS: OnceLock<(PrivateKey, PublicKey)> = OnceLock::new();
    KEYS.get_or_init(|| {
        let private = PrivateKey::from(generate());
        let public = private.public_key();
        (private, public)
    })
}
