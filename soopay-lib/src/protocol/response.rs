//! Verification of gateway payloads.
//!
//! Synchronous responses arrive as an HTML page whose
//! `meta[name='MobilePayPlatform']` content is a urlencoded query string.
//! Asynchronous notifications arrive as plain query parameters. Both are
//! checked against the gateway public key with SHA-256 ([`RESPONSE_DIGEST`])
//! and either every field is returned or none is.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use scraper::{Html, Selector};

use crate::crypto::PublicKey;
use crate::errors::KeyKind;
use crate::params::{Params, SIGN_KEY};
use crate::{Result, SoopayError};

use super::{verifying_options, META_NAME, RESPONSE_DIGEST};

/// Locate the meta tag payload in an HTML body.
pub fn extract_meta_content(body: &[u8]) -> Result<String> {
    let html = String::from_utf8_lossy(body);
    let doc = Html::parse_document(&html);

    let selector = Selector::parse(&format!("meta[name='{}']", META_NAME))
        .map_err(|e| SoopayError::MalformedResponse(format!("invalid selector: {:?}", e)))?;

    let content = doc
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default();

    if content.is_empty() {
        return Err(SoopayError::MalformedResponse(
            "empty meta content".to_string(),
        ));
    }

    Ok(content.to_string())
}

/// Verify a gateway HTML response body.
pub fn verify_html(body: &[u8], key: Option<&PublicKey>) -> Result<Params> {
    let content = extract_meta_content(body)?;
    verify_query_string(&content, key)
}

/// Verify a urlencoded query string, e.g. a notification URL's query.
pub fn verify_query_string(query: &str, key: Option<&PublicKey>) -> Result<Params> {
    verify_params(Params::from_query(query), key)
}

/// Verify already-decoded query pairs.
///
/// A key repeated in `pairs` keeps its first value.
pub fn verify_query<I, K, V>(pairs: I, key: Option<&PublicKey>) -> Result<Params>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    verify_params(Params::from_first_values(pairs), key)
}

fn verify_params(params: Params, key: Option<&PublicKey>) -> Result<Params> {
    let key = key.ok_or_else(|| SoopayError::key_missing(KeyKind::Public))?;

    let sig = params
        .get(SIGN_KEY)
        .and_then(|s| STANDARD.decode(s).ok())
        .ok_or(SoopayError::SignatureInvalid)?;

    let sign_str = params.encode("=", "&", &verifying_options());
    key.verify(RESPONSE_DIGEST, sign_str.as_bytes(), &sig)?;

    Ok(params)
}
