//! Signed acknowledgment of gateway notifications.

use crate::crypto::PrivateKey;
use crate::errors::KeyKind;
use crate::params::{Params, SIGN_TYPE_KEY};
use crate::{Result, SoopayError};

use super::{render_meta_html, sign_params, wire_options, REPLY_DIGEST, SIGN_TYPE_RSA, VERSION};

/// Build the HTML page answering a gateway notification.
///
/// `data` is completed in place with `mer_id`, `sign_type`, `version` and
/// `sign`. Signed with SHA-256 ([`REPLY_DIGEST`]), not SHA-1 like requests.
pub fn build_reply_html(
    merchant_id: &str,
    data: &mut Params,
    key: Option<&PrivateKey>,
) -> Result<String> {
    let key = key.ok_or_else(|| SoopayError::key_missing(KeyKind::Private))?;

    data.set("mer_id", merchant_id)
        .set(SIGN_TYPE_KEY, SIGN_TYPE_RSA)
        .set("version", VERSION);

    sign_params(data, key, REPLY_DIGEST)?;

    Ok(render_meta_html(&data.encode("=", "&", &wire_options())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::DigestAlgorithm;
    use crate::params::SIGN_KEY;
    use crate::protocol::response::extract_meta_content;
    use crate::protocol::signing_string;
    use crate::test_utils::merchant_keys;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn notify_ack() -> Params {
        [
            ("order_id", "A001"),
            ("mer_date", "20240101"),
            ("ret_code", "0000"),
            ("ret_msg", ""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_reply_skeleton() {
        let (private, _) = merchant_keys();
        let mut data = notify_ack();

        let html = build_reply_html("M1", &mut data, Some(private)).unwrap();

        assert!(html.starts_with(
            r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN"><html><head><META NAME="MobilePayPlatform" CONTENT=""#
        ));
        assert!(html.ends_with(r#""/></head><body></body></html>"#));
        assert!(html.contains("mer_id=M1"));
        assert!(html.contains("sign_type=RSA"));
        assert!(html.contains("version=4.0"));
        assert!(!html.contains("ret_msg"));
    }

    #[test]
    fn test_reply_signed_with_sha256() {
        let (private, public) = merchant_keys();
        let mut data = notify_ack();

        let html = build_reply_html("M1", &mut data, Some(private)).unwrap();

        let content = extract_meta_content(html.as_bytes()).unwrap();
        let parsed = Params::from_query(&content);
        assert_eq!(parsed.get(SIGN_KEY), data.get(SIGN_KEY));

        let sig = STANDARD.decode(parsed.get(SIGN_KEY).unwrap()).unwrap();
        let signed = signing_string(&parsed);
        public
            .verify(DigestAlgorithm::Sha256, signed.as_bytes(), &sig)
            .unwrap();
        assert!(public
            .verify(DigestAlgorithm::Sha1, signed.as_bytes(), &sig)
            .is_err());
    }

    #[test]
    fn test_reply_without_key() {
        let mut data = notify_ack();
        assert!(matches!(
            build_reply_html("M1", &mut data, None),
            Err(SoopayError::KeyMissing {
                key: KeyKind::Private
            })
        ));
    }
}
