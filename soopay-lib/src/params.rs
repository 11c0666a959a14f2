//! Protocol parameter map and its canonical serialization.
//!
//! Both sides of the gateway protocol sign the same string independently, so
//! [`Params::encode`] must be byte-for-byte reproducible. Keys are held in a
//! `BTreeMap`, which orders `String` keys by their raw UTF-8 bytes; iteration
//! order is therefore the canonical order regardless of insertion order.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Field carrying the base64 signature.
pub const SIGN_KEY: &str = "sign";

/// Field carrying the signature algorithm token.
pub const SIGN_TYPE_KEY: &str = "sign_type";

/// Field carrying the gateway result code.
pub const RET_CODE_KEY: &str = "ret_code";

/// Gateway result code for success.
pub const RET_CODE_OK: &str = "0000";

/// How empty values are treated during encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyMode {
    /// Include `key=` pairs whose value is empty.
    #[default]
    Keep,
    /// Omit pairs whose value is empty.
    Ignore,
}

/// Options for [`Params::encode`].
///
/// ```rust,ignore
/// let opts = EncodeOptions::new()
///     .empty_mode(EmptyMode::Ignore)
///     .ignore_keys([SIGN_KEY, SIGN_TYPE_KEY]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Empty value policy.
    pub empty_mode: EmptyMode,
    /// Keys left out of the output.
    pub ignore_keys: BTreeSet<String>,
    /// Form-urlencode keys and values.
    pub escape: bool,
}

impl EncodeOptions {
    /// Keep empty values, exclude nothing, no escaping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the empty value policy.
    pub fn empty_mode(mut self, mode: EmptyMode) -> Self {
        self.empty_mode = mode;
        self
    }

    /// Exclude the given keys.
    pub fn ignore_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Form-urlencode keys and values (transport form).
    pub fn escaped(mut self) -> Self {
        self.escape = true;
        self
    }
}

/// String-to-string protocol fields, unique keys.
///
/// Created per call and never shared across calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a urlencoded query string.
    ///
    /// A key appearing more than once keeps its first value.
    pub fn from_query(query: &str) -> Self {
        Self::from_first_values(form_urlencoded::parse(query.as_bytes()))
    }

    /// Collect pairs, keeping the first value seen for each key.
    pub fn from_first_values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (k, v) in pairs {
            map.entry(k.into()).or_insert_with(|| v.into());
        }
        Self(map)
    }

    /// Insert or overwrite a field.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Whether the field is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in canonical (byte-wise ascending key) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether `ret_code` reports success.
    pub fn is_ret_ok(&self) -> bool {
        self.get(RET_CODE_KEY) == Some(RET_CODE_OK)
    }

    /// Serialize as `key{kv_sep}value` pairs joined by `pair_sep`, keys sorted.
    pub fn encode(&self, kv_sep: &str, pair_sep: &str, opts: &EncodeOptions) -> String {
        let mut out = String::new();

        for (k, v) in &self.0 {
            if opts.ignore_keys.contains(k) {
                continue;
            }
            if opts.empty_mode == EmptyMode::Ignore && v.is_empty() {
                continue;
            }

            if !out.is_empty() {
                out.push_str(pair_sep);
            }

            if opts.escape {
                out.extend(form_urlencoded::byte_serialize(k.as_bytes()));
                out.push_str(kv_sep);
                out.extend(form_urlencoded::byte_serialize(v.as_bytes()));
            } else {
                out.push_str(k);
                out.push_str(kv_sep);
                out.push_str(v);
            }
        }

        out
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    /// Later values overwrite earlier ones, like repeated [`Params::set`].
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Params {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl IntoIterator for Params {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<BTreeMap<String, String>> for Params {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing_opts() -> EncodeOptions {
        EncodeOptions::new()
            .empty_mode(EmptyMode::Ignore)
            .ignore_keys([SIGN_KEY, SIGN_TYPE_KEY])
    }

    #[test]
    fn test_encode_sorts_keys() {
        let mut p = Params::new();
        p.set("order_no", "A001").set("amount", "100").set("mer_id", "M1");

        assert_eq!(
            p.encode("=", "&", &EncodeOptions::new()),
            "amount=100&mer_id=M1&order_no=A001"
        );
    }

    #[test]
    fn test_encode_independent_of_insertion_order() {
        let a: Params = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let mut b = Params::new();
        b.set("c", "3").set("a", "1").set("b", "2");

        let opts = signing_opts();
        assert_eq!(a.encode("=", "&", &opts), b.encode("=", "&", &opts));
        assert_eq!(a.encode("=", "&", &opts), a.encode("=", "&", &opts));
    }

    #[test]
    fn test_sort_is_bytewise() {
        // Uppercase sorts before lowercase, underscore between them.
        let p: Params = [("b", "1"), ("B", "2"), ("_x", "3"), ("a_b", "4"), ("ab", "5")]
            .into_iter()
            .collect();

        assert_eq!(
            p.encode("=", "&", &EncodeOptions::new()),
            "B=2&_x=3&a_b=4&ab=5&b=1"
        );
    }

    #[test]
    fn test_empty_mode() {
        let p: Params = [("a", "1"), ("b", ""), ("c", "3")].into_iter().collect();

        assert_eq!(p.encode("=", "&", &EncodeOptions::new()), "a=1&b=&c=3");
        assert_eq!(
            p.encode("=", "&", &EncodeOptions::new().empty_mode(EmptyMode::Ignore)),
            "a=1&c=3"
        );
    }

    #[test]
    fn test_ignore_keys_excludes_signature_fields() {
        let mut p = Params::new();
        for i in 0..20 {
            p.set(format!("k{:02}", i), format!("v{}", i));
        }
        p.set(SIGN_KEY, "SIGVALUE").set(SIGN_TYPE_KEY, "RSA");

        let s = p.encode("=", "&", &signing_opts());
        assert!(!s.contains("sign=SIGVALUE"));
        assert!(!s.contains("sign_type=RSA"));
        assert!(s.starts_with("k00=v0&"));
    }

    #[test]
    fn test_set_overwrites() {
        let mut p = Params::new();
        p.set("a", "1").set("a", "2");
        assert_eq!(p.len(), 1);
        assert_eq!(p.get("a"), Some("2"));
    }

    #[test]
    fn test_escaped_round_trip() {
        let p: Params = [
            ("sign", "ab+c/d=="),
            ("goods", "a b&c=d"),
            ("note", "中文"),
        ]
        .into_iter()
        .collect();

        let query = p.encode("=", "&", &EncodeOptions::new().escaped());
        assert!(!query.contains(' '));
        assert_eq!(Params::from_query(&query), p);
    }

    #[test]
    fn test_from_query_keeps_first_value() {
        let p = Params::from_query("a=1&b=2&a=3");
        assert_eq!(p.get("a"), Some("1"));
        assert_eq!(p.get("b"), Some("2"));
    }

    #[test]
    fn test_ret_code() {
        let mut p = Params::new();
        assert!(!p.is_ret_ok());
        p.set(RET_CODE_KEY, "00060780");
        assert!(!p.is_ret_ok());
        p.set(RET_CODE_KEY, RET_CODE_OK);
        assert!(p.is_ret_ok());
    }
}
