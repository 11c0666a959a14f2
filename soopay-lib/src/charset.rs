//! Transcoding of gateway text encoded in GBK.

use encoding_rs::GBK;

use crate::{Result, SoopayError};

/// Decode GBK bytes into a UTF-8 string.
///
/// Invalid sequences are an error rather than replacement characters, so a
/// wrong key or corrupted ciphertext never yields plausible-looking text.
pub fn gbk_to_utf8(bytes: &[u8]) -> Result<String> {
    GBK.decode_without_bom_handling_and_without_replacement(bytes)
        .map(|s| s.into_owned())
        .ok_or_else(|| SoopayError::Charset("invalid GBK byte sequence".to_string()))
}
