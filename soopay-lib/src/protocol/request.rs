//! Outbound request construction.

use crate::crypto::PrivateKey;
use crate::errors::KeyKind;
use crate::params::{Params, SIGN_TYPE_KEY};
use crate::{Result, SoopayError};

use super::{
    sign_params, wire_options, CHARSET, REQUEST_DIGEST, RES_FORMAT_HTML, SIGN_TYPE_RSA, VERSION,
};

/// Build the signed, form-encoded request body for `service`.
///
/// The protocol fields are added to `biz_data` in place, followed by `sign`.
/// The body is signed with SHA-1 ([`REQUEST_DIGEST`]).
pub fn build_request_form(
    service: &str,
    merchant_id: &str,
    biz_data: &mut Params,
    key: Option<&PrivateKey>,
) -> Result<String> {
    let key = key.ok_or_else(|| SoopayError::key_missing(KeyKind::Private))?;

    biz_data
        .set("service", service)
        .set("charset", CHARSET)
        .set(SIGN_TYPE_KEY, SIGN_TYPE_RSA)
        .set("res_format", RES_FORMAT_HTML)
        .set("version", VERSION)
        .set("mer_id", merchant_id);

    sign_params(biz_data, key, REQUEST_DIGEST)?;

    Ok(biz_data.encode("=", "&", &wire_options()))
}
