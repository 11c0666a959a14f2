//! Gateway simulator.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::fixtures::{gateway_keys, merchant_keys};
use crate::crypto::{DigestAlgorithm, PrivateKey, PublicKey};
use crate::params::{EncodeOptions, Params, SIGN_KEY, SIGN_TYPE_KEY};
use crate::protocol::response::extract_meta_content;
use crate::protocol::{
    render_meta_html, signing_string, verifying_options, REPLY_DIGEST, REQUEST_DIGEST,
    RESPONSE_DIGEST, SIGN_TYPE_RSA,
};
use crate::{Result, SoopayError};

/// Plays the gateway side of the protocol.
pub struct GatewaySimulator {
    signing_key: PrivateKey,
    merchant_public: PublicKey,
}

impl Default for GatewaySimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewaySimulator {
    /// Sign with the gateway fixture key, verify with the merchant fixture key.
    pub fn new() -> Self {
        Self::with_key(gateway_keys().0.clone())
    }

    /// Sign responses with an arbitrary key (e.g. to forge them).
    pub fn with_key(signing_key: PrivateKey) -> Self {
        Self {
            signing_key,
            merchant_public: merchant_keys().1.clone(),
        }
    }

    /// Add `sign_type` and a SHA-256 `sign` over every non-signature field.
    pub fn sign(&self, fields: &Params) -> Params {
        let mut signed = fields.clone();
        signed.set(SIGN_TYPE_KEY, SIGN_TYPE_RSA);

        let sign_str = signed.encode("=", "&", &verifying_options());
        let sig = self
            .signing_key
            .sign(RESPONSE_DIGEST, sign_str.as_bytes())
            .expect("simulator signing");
        signed.set(SIGN_KEY, STANDARD.encode(sig));
        signed
    }

    /// Signed fields as a urlencoded query string, empty values included.
    pub fn respond_query(&self, fields: &Params) -> String {
        self.sign(fields)
            .encode("=", "&", &EncodeOptions::new().escaped())
    }

    /// Signed fields wrapped in the meta-tag HTML page.
    pub fn respond_html(&self, fields: &Params) -> String {
        render_meta_html(&self.respond_query(fields))
    }

    /// Check a merchant request body the way the gateway does (SHA-1).
    pub fn verify_request(&self, form: &str) -> Result<Params> {
        self.verify_merchant(Params::from_query(form), REQUEST_DIGEST)
    }

    /// Check a merchant notification reply the way the gateway does (SHA-256).
    pub fn verify_reply(&self, html: &str) -> Result<Params> {
        let content = extract_meta_content(html.as_bytes())?;
        self.verify_merchant(Params::from_query(&content), REPLY_DIGEST)
    }

    fn verify_merchant(&self, params: Params, digest: DigestAlgorithm) -> Result<Params> {
        let sig = params
            .get(SIGN_KEY)
            .and_then(|s| STANDARD.decode(s).ok())
            .ok_or(SoopayError::SignatureInvalid)?;

        self.merchant_public
            .verify(digest, signing_string(&params).as_bytes(), &sig)?;
        Ok(params)
    }
}
