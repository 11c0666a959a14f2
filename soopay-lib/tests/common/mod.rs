//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::OnceLock;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::RsaPrivateKey;
use soopay_lib::crypto::{DigestAlgorithm, PrivateKey};
use soopay_lib::protocol::{render_meta_html, verifying_options, RESPONSE_DIGEST};
use soopay_lib::{Client, ClientConfig, EncodeOptions, Params};

pub const GATEWAY_PATH: &str = "/spay/pay/payservice.do";

pub struct Keys {
    pub merchant: PrivateKey,
    pub gateway: PrivateKey,
}

pub fn keys() -> &'static Keys {
    static KEYS: OnceLock<Keys> = OnceLock::new();
    KEYS.get_or_init(|| {
        let mut rng = rand::thread_rng();
        Keys {
            merchant: RsaPrivateKey::new(&mut rng, 1024).unwrap().into(),
            gateway: RsaPrivateKey::new(&mut rng, 1024).unwrap().into(),
        }
    })
}

/// A client pointed at a mock gateway, using the default reqwest transport.
pub fn client(server_uri: &str, config: impl FnOnce(ClientConfig) -> ClientConfig) -> Client {
    let keys = keys();
    let config = config(
        ClientConfig::new("M1").with_gateway_url(format!("{}{}", server_uri, GATEWAY_PATH)),
    );
    Client::builder(config)
        .private_key(keys.merchant.clone())
        .public_key(keys.gateway.public_key())
        .build()
        .unwrap()
}

/// Gateway response page signed with `key` (SHA-256).
pub fn signed_page(key: &PrivateKey, fields: &Params) -> String {
    let mut signed = fields.clone();
    signed.set("sign_type", "RSA");
    let sign_str = signed.encode("=", "&", &verifying_options());
    let sig = key.sign(RESPONSE_DIGEST, sign_str.as_bytes()).unwrap();
    signed.set("sign", STANDARD.encode(sig));

    render_meta_html(&signed.encode("=", "&", &EncodeOptions::new().escaped()))
}

/// Check a captured request body against the merchant key with `digest`.
pub fn merchant_signed(body: &str, digest: DigestAlgorithm) -> bool {
    let params = Params::from_query(body);
    let Some(sig) = params.get("sign").and_then(|s| STANDARD.decode(s).ok()) else {
        return false;
    };
    keys()
        .merchant
        .public_key()
        .verify(
            digest,
            soopay_lib::protocol::signing_string(&params).as_bytes(),
            &sig,
        )
        .is_ok()
}
