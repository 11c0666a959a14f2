//! Gateway signing protocol.
//!
//! Three paths share one canonicalization:
//!
//! - [`request`]: merchant → gateway form, signed with [`REQUEST_DIGEST`]
//! - [`response`]: gateway → merchant meta-tag payload, verified with [`RESPONSE_DIGEST`]
//! - [`reply`]: merchant acknowledgment of a gateway notification, signed with [`REPLY_DIGEST`]
//!
//! # Digest asymmetry
//!
//! The gateway expects SHA-1 on outbound requests and SHA-256 on everything
//! else. The three constants below must stay distinct; unifying them breaks
//! interoperability with the live gateway.

pub mod reply;
pub mod request;
pub mod response;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::{DigestAlgorithm, PrivateKey};
use crate::params::{EmptyMode, EncodeOptions, Params, SIGN_KEY, SIGN_TYPE_KEY};
use crate::Result;

/// Digest for requests sent to the gateway. SHA-1, mandated by the gateway.
pub const REQUEST_DIGEST: DigestAlgorithm = DigestAlgorithm::Sha1;

/// Digest for payloads received from the gateway (responses and notifications).
pub const RESPONSE_DIGEST: DigestAlgorithm = DigestAlgorithm::Sha256;

/// Digest for notification replies. SHA-256, unlike requests.
pub const REPLY_DIGEST: DigestAlgorithm = DigestAlgorithm::Sha256;

/// `charset` field value.
pub const CHARSET: &str = "UTF-8";

/// `sign_type` field value.
pub const SIGN_TYPE_RSA: &str = "RSA";

/// `res_format` field value.
pub const RES_FORMAT_HTML: &str = "HTML";

/// `version` field value.
pub const VERSION: &str = "4.0";

/// `name` of the meta tag carrying signed payloads.
pub const META_NAME: &str = "MobilePayPlatform";

/// Canonical string options for signing outbound data: empty values
/// ignored, signature fields excluded.
pub fn signing_options() -> EncodeOptions {
    EncodeOptions::new()
        .empty_mode(EmptyMode::Ignore)
        .ignore_keys([SIGN_KEY, SIGN_TYPE_KEY])
}

/// Canonical string options for verifying inbound data: every received
/// field kept, signature fields excluded.
pub fn verifying_options() -> EncodeOptions {
    EncodeOptions::new().ignore_keys([SIGN_KEY, SIGN_TYPE_KEY])
}

/// Options for the transport form and reply payload.
pub fn wire_options() -> EncodeOptions {
    EncodeOptions::new().empty_mode(EmptyMode::Ignore).escaped()
}

/// The exact string signed for outbound `params`.
pub fn signing_string(params: &Params) -> String {
    params.encode("=", "&", &signing_options())
}

/// Sign `params` with `digest` and store the base64 signature under `sign`.
pub(crate) fn sign_params(
    params: &mut Params,
    key: &PrivateKey,
    digest: DigestAlgorithm,
) -> Result<()> {
    let sign_str = signing_string(params);
    let sig = key.sign(digest, sign_str.as_bytes())?;
    params.set(SIGN_KEY, STANDARD.encode(sig));
    Ok(())
}

/// Wrap an encoded payload in the gateway's HTML skeleton.
pub fn render_meta_html(content: &str) -> String {
    format!(
        r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN"><html><head><META NAME="{}" CONTENT="{}"/></head><body></body></html>"#,
        META_NAME, content
    )
}
