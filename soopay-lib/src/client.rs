//! Soopay gateway client.
//!
//! A [`Client`] is built once per merchant account and shared freely: keys,
//! configuration and transport are read-only, and every call keeps its
//! fields in its own [`Params`].
//!
//! # Example
//!
//! ```rust,ignore
//! use soopay_lib::{Client, ClientConfig, Params};
//! use soopay_lib::crypto::{load_private_key_from_pfx_file, load_public_key_from_file};
//! use tokio_util::sync::CancellationToken;
//!
//! let client = Client::builder(ClientConfig::new("60000100"))
//!     .private_key(load_private_key_from_pfx_file("merchant.p12", "password")?)
//!     .public_key(load_public_key_from_file("gateway.crt")?)
//!     .build()?;
//!
//! let mut data = Params::new();
//! data.set("order_id", "A001").set("amount", "100");
//!
//! let result = client.execute(&CancellationToken::new(), "query_order", &mut data).await?;
//! assert!(result.is_ret_ok());
//! ```

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio_util::sync::CancellationToken;

use crate::charset::gbk_to_utf8;
use crate::config::ClientConfig;
use crate::crypto::{PrivateKey, PublicKey};
use crate::errors::KeyKind;
use crate::log::{LogGuard, LogHook, RequestLog};
use crate::params::Params;
use crate::protocol::{reply, request, response};
use crate::transport::{HttpOptions, HttpRequest, HttpTransport};
use crate::{Result, SoopayError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Builder for [`Client`].
pub struct ClientBuilder {
    config: ClientConfig,
    private_key: Option<PrivateKey>,
    public_key: Option<PublicKey>,
    transport: Option<Arc<dyn HttpTransport>>,
    logger: Option<LogHook>,
}

impl ClientBuilder {
    /// Merchant private key, for signing requests and replies and decrypting.
    pub fn private_key(mut self, key: PrivateKey) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Gateway public key, for verifying responses and encrypting.
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Use a custom transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Receive a [`RequestLog`] once per gateway call.
    ///
    /// Also called when the call future is dropped before completing.
    pub fn logger<F>(mut self, f: F) -> Self
    where
        F: Fn(&RequestLog) + Send + Sync + 'static,
    {
        self.logger = Some(Arc::new(f));
        self
    }

    /// Validate the configuration and build the client.
    ///
    /// Falls back to the reqwest transport when none was supplied.
    pub fn build(self) -> Result<Client> {
        self.config.validate()?;

        let transport = match self.transport {
            Some(t) => t,
            None => default_transport(&self.config)?,
        };

        Ok(Client {
            config: self.config,
            private_key: self.private_key,
            public_key: self.public_key,
            transport,
            logger: self.logger,
        })
    }
}

#[cfg(feature = "http-transport")]
fn default_transport(config: &ClientConfig) -> Result<Arc<dyn HttpTransport>> {
    Ok(Arc::new(crate::transport::ReqwestTransport::new(config)?))
}

#[cfg(not(feature = "http-transport"))]
fn default_transport(_config: &ClientConfig) -> Result<Arc<dyn HttpTransport>> {
    Err(SoopayError::invalid_data(
        "transport",
        "no transport supplied and the 'http-transport' feature is disabled",
    ))
}

/// Soopay gateway client.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    private_key: Option<PrivateKey>,
    public_key: Option<PublicKey>,
    transport: Arc<dyn HttpTransport>,
    logger: Option<LogHook>,
}

impl Client {
    /// Start building a client for the merchant in `config`.
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            private_key: None,
            public_key: None,
            transport: None,
            logger: None,
        }
    }

    /// Merchant identifier.
    pub fn merchant_id(&self) -> &str {
        &self.config.merchant_id
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// RSA-encrypt a sensitive field (card number, ID number) for the gateway.
    ///
    /// Returns standard base64.
    pub fn encrypt(&self, plain: &str) -> Result<String> {
        let key = self
            .public_key
            .as_ref()
            .ok_or_else(|| SoopayError::key_missing(KeyKind::Public))?;

        let cipher = key.encrypt(plain.as_bytes())?;
        Ok(STANDARD.encode(cipher))
    }

    /// Decrypt a base64 field from the gateway and transcode it from GBK.
    pub fn decrypt(&self, cipher: &str) -> Result<String> {
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| SoopayError::key_missing(KeyKind::Private))?;

        let bytes = STANDARD.decode(cipher)?;
        let plain = key.decrypt(&bytes)?;
        gbk_to_utf8(&plain)
    }

    /// Build the signed request form for `service` without sending it.
    pub fn request_form(&self, service: &str, biz_data: &mut Params) -> Result<String> {
        request::build_request_form(
            service,
            &self.config.merchant_id,
            biz_data,
            self.private_key.as_ref(),
        )
    }

    /// Call `service` on the gateway and return the verified result fields.
    ///
    /// `biz_data` receives the protocol fields and signature. The call is
    /// attempted once; if `cancel` fires while the request is in flight the
    /// result is [`SoopayError::Cancelled`].
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        service: &str,
        biz_data: &mut Params,
    ) -> Result<Params> {
        self.execute_with(cancel, service, biz_data, HttpOptions::new())
            .await
    }

    /// Like [`Client::execute`] with extra headers, cookies or close behavior.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, cancel, biz_data, options), fields(merchant_id = %self.config.merchant_id)))]
    pub async fn execute_with(
        &self,
        cancel: &CancellationToken,
        service: &str,
        biz_data: &mut Params,
        options: HttpOptions,
    ) -> Result<Params> {
        let mut guard = LogGuard::new(
            RequestLog::new("POST", &self.config.gateway_url),
            self.logger.clone(),
        );

        let result = self
            .execute_inner(cancel, service, biz_data, options, guard.log_mut())
            .await;

        #[cfg(feature = "tracing")]
        if let Err(e) = &result {
            tracing::warn!(service, error = %e, "gateway call failed");
        }
        guard.complete(&result);

        result
    }

    async fn execute_inner(
        &self,
        cancel: &CancellationToken,
        service: &str,
        biz_data: &mut Params,
        options: HttpOptions,
        log: &mut RequestLog,
    ) -> Result<Params> {
        let form = self.request_form(service, biz_data)?;
        log.set_request_body(form.as_str());

        let options = if options.has_header("content-type") {
            options
        } else {
            options.header("Content-Type", FORM_CONTENT_TYPE)
        };

        let request = HttpRequest {
            method: "POST".to_string(),
            url: self.config.gateway_url.clone(),
            body: form.into_bytes(),
            options,
        };

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SoopayError::Cancelled),
            resp = self.transport.send(request) => resp?,
        };

        log.set_response_headers(&response.headers);
        log.set_status_code(response.status);

        if response.status != 200 {
            return Err(SoopayError::HttpStatus {
                status: response.status,
            });
        }

        log.set_response_body(String::from_utf8_lossy(&response.body));

        self.verify_html(&response.body)
    }

    /// Verify a gateway HTML response body.
    pub fn verify_html(&self, body: &[u8]) -> Result<Params> {
        response::verify_html(body, self.public_key.as_ref())
    }

    /// Verify notification parameters already split into pairs.
    pub fn verify_query<I, K, V>(&self, pairs: I) -> Result<Params>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        response::verify_query(pairs, self.public_key.as_ref())
    }

    /// Verify a raw notification query string.
    pub fn verify_query_string(&self, query: &str) -> Result<Params> {
        response::verify_query_string(query, self.public_key.as_ref())
    }

    /// Build the signed HTML acknowledging a gateway notification.
    pub fn reply_html(&self, data: &mut Params) -> Result<String> {
        reply::build_reply_html(&self.config.merchant_id, data, self.private_key.as_ref())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("merchant_id", &self.config.merchant_id)
            .field("gateway_url", &self.config.gateway_url)
            .field("has_private_key", &self.private_key.is_some())
            .field("has_public_key", &self.public_key.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SIGN_KEY;
    use crate::protocol::REQUEST_DIGEST;
    use crate::test_utils::{gateway_keys, merchant_keys, GatewaySimulator, MockTransport};
    use std::sync::Mutex;
    use std::time::Duration;

    fn client_with(transport: Arc<MockTransport>) -> Client {
        Client::builder(ClientConfig::new("M1").with_gateway_url("https://gateway.test/spay"))
            .private_key(merchant_keys().0.clone())
            .public_key(gateway_keys().1.clone())
            .transport(transport)
            .build()
            .unwrap()
    }

    fn order() -> Params {
        [("amount", "100"), ("order_no", "A001")].into_iter().collect()
    }

    #[tokio::test]
    async fn test_execute_round_trip() {
        let gateway = GatewaySimulator::new();
        let mut result = Params::new();
        result.set("ret_code", "0000").set("trade_no", "T1");
        let transport = Arc::new(MockTransport::html(gateway.respond_html(&result)));
        let client = client_with(transport.clone());

        let mut data = order();
        let verified = client
            .execute(&CancellationToken::new(), "buy", &mut data)
            .await
            .unwrap();

        assert!(verified.is_ret_ok());
        assert_eq!(verified.get("trade_no"), Some("T1"));

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "POST");
        assert_eq!(sent[0].url, "https://gateway.test/spay");
        assert!(sent[0].options.has_header("content-type"));

        // The gateway sees a SHA-1 signature from the merchant key.
        let body = String::from_utf8(sent[0].body.clone()).unwrap();
        let received = gateway.verify_request(&body).unwrap();
        assert_eq!(received.get("service"), Some("buy"));
        assert_eq!(received.get(SIGN_KEY), data.get(SIGN_KEY));
    }

    #[tokio::test]
    async fn test_non_200_is_transport_failure() {
        let transport = Arc::new(MockTransport::status(502, "bad gateway"));
        let client = client_with(transport);

        let err = client
            .execute(&CancellationToken::new(), "buy", &mut order())
            .await
            .unwrap_err();

        assert!(matches!(err, SoopayError::HttpStatus { status: 502 }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_unverified_response_yields_nothing() {
        let forger = GatewaySimulator::with_key(merchant_keys().0.clone());
        let mut result = Params::new();
        result.set("ret_code", "0000");
        let transport = Arc::new(MockTransport::html(forger.respond_html(&result)));
        let client = client_with(transport);

        let err = client
            .execute(&CancellationToken::new(), "buy", &mut order())
            .await
            .unwrap_err();

        assert!(matches!(err, SoopayError::SignatureInvalid));
    }

    #[tokio::test]
    async fn test_cancellation_surfaces_as_cancelled() {
        let transport = Arc::new(
            MockTransport::html("<html></html>").with_delay(Duration::from_secs(30)),
        );
        let client = client_with(transport);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = client
            .execute(&cancel, "buy", &mut order())
            .await
            .unwrap_err();

        assert!(matches!(err, SoopayError::Cancelled));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let transport = Arc::new(MockTransport::failing("connection refused"));
        let client = client_with(transport);

        let err = client
            .execute(&CancellationToken::new(), "buy", &mut order())
            .await
            .unwrap_err();

        assert!(matches!(err, SoopayError::Transport(msg) if msg == "connection refused"));
    }

    #[tokio::test]
    async fn test_missing_private_key_sends_nothing() {
        let transport = Arc::new(MockTransport::html("<html></html>"));
        let client = Client::builder(ClientConfig::new("M1"))
            .public_key(gateway_keys().1.clone())
            .transport(transport.clone())
            .build()
            .unwrap();

        let err = client
            .execute(&CancellationToken::new(), "buy", &mut order())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SoopayError::KeyMissing {
                key: KeyKind::Private
            }
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_logger_called_once_per_call() {
        let gateway = GatewaySimulator::new();
        let mut result = Params::new();
        result.set("ret_code", "0000");
        let transport = Arc::new(MockTransport::html(gateway.respond_html(&result)));

        let seen: Arc<Mutex<Vec<RequestLog>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let client = Client::builder(ClientConfig::new("M1"))
            .private_key(merchant_keys().0.clone())
            .public_key(gateway_keys().1.clone())
            .transport(transport)
            .logger(move |log| sink.lock().unwrap().push(log.clone()))
            .build()
            .unwrap();

        client
            .execute(&CancellationToken::new(), "buy", &mut order())
            .await
            .unwrap();

        let logs = seen.lock().unwrap();
        assert_eq!(logs.len(), 1);
        let map = logs[0].to_map();
        assert_eq!(map["method"], "POST");
        assert_eq!(map["status_code"], "200");
        assert!(map["request_body"].contains("service=buy"));
        assert!(map["response_body"].contains("MobilePayPlatform"));
        assert!(!map.contains_key("error"));
    }

    #[tokio::test]
    async fn test_logger_records_failure() {
        let transport = Arc::new(MockTransport::status(500, ""));
        let seen: Arc<Mutex<Vec<RequestLog>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let client = Client::builder(ClientConfig::new("M1"))
            .private_key(merchant_keys().0.clone())
            .transport(transport)
            .logger(move |log| sink.lock().unwrap().push(log.clone()))
            .build()
            .unwrap();

        let _ = client
            .execute(&CancellationToken::new(), "buy", &mut order())
            .await;

        let logs = seen.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status_code, Some(500));
        assert!(logs[0].response_body.is_none());
        assert!(logs[0].error.as_deref().unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_logger_called_when_call_is_abandoned() {
        let transport = Arc::new(
            MockTransport::html("<html></html>").with_delay(Duration::from_secs(30)),
        );
        let seen: Arc<Mutex<Vec<RequestLog>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let client = Client::builder(ClientConfig::new("M1"))
            .private_key(merchant_keys().0.clone())
            .transport(transport)
            .logger(move |log| sink.lock().unwrap().push(log.clone()))
            .build()
            .unwrap();

        let mut data = order();
        let outcome = tokio::time::timeout(
            Duration::from_millis(50),
            client.execute(&CancellationToken::new(), "buy", &mut data),
        )
        .await;
        assert!(outcome.is_err());

        let logs = seen.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].error.as_deref(), Some(crate::log::DROPPED_ERROR));
        assert!(logs[0].request_body.as_deref().unwrap().contains("service=buy"));
        assert!(logs[0].status_code.is_none());
    }

    #[test]
    fn test_encrypt_decrypt_gbk() {
        // A client holding both halves of one pair, so it can read its own ciphertext.
        let (private, public) = merchant_keys();
        let client = Client::builder(ClientConfig::new("M1"))
            .private_key(private.clone())
            .public_key(public.clone())
            .transport(Arc::new(MockTransport::html("")))
            .build()
            .unwrap();

        let cipher = client.encrypt("6222020000000000000").unwrap();
        assert_eq!(client.decrypt(&cipher).unwrap(), "6222020000000000000");

        // Gateway-side GBK plaintext
        let gbk = public.encrypt(&[0xD5, 0xC5, 0xC8, 0xFD]).unwrap();
        assert_eq!(client.decrypt(&STANDARD.encode(gbk)).unwrap(), "张三");
    }

    #[test]
    fn test_crypto_without_keys() {
        let client = Client::builder(ClientConfig::new("M1"))
            .transport(Arc::new(MockTransport::html("")))
            .build()
            .unwrap();

        assert!(matches!(
            client.encrypt("x"),
            Err(SoopayError::KeyMissing {
                key: KeyKind::Public
            })
        ));
        assert!(matches!(
            client.decrypt("eA=="),
            Err(SoopayError::KeyMissing {
                key: KeyKind::Private
            })
        ));
        assert!(matches!(
            client.reply_html(&mut Params::new()),
            Err(SoopayError::KeyMissing { .. })
        ));
        assert!(matches!(
            client.verify_query_string("a=1&sign=eA=="),
            Err(SoopayError::KeyMissing { .. })
        ));
    }

    #[test]
    fn test_reply_verifiable_by_gateway() {
        let client = client_with(Arc::new(MockTransport::html("")));
        let gateway = GatewaySimulator::new();

        let mut ack = Params::new();
        ack.set("order_id", "A001").set("ret_code", "0000");
        let html = client.reply_html(&mut ack).unwrap();

        let received = gateway.verify_reply(&html).unwrap();
        assert_eq!(received.get("mer_id"), Some("M1"));
        assert_eq!(received.get("order_id"), Some("A001"));
    }

    #[test]
    fn test_request_and_reply_digests_differ() {
        let client = client_with(Arc::new(MockTransport::html("")));
        let gateway = GatewaySimulator::new();

        let mut data = order();
        let form = client.request_form("buy", &mut data).unwrap();
        assert!(gateway.verify_request(&form).is_ok());

        // A request body presented as a reply fails: the digests differ.
        let as_reply = crate::protocol::render_meta_html(&form);
        assert!(matches!(
            gateway.verify_reply(&as_reply),
            Err(SoopayError::SignatureInvalid)
        ));
        assert_eq!(REQUEST_DIGEST, crate::crypto::DigestAlgorithm::Sha1);
    }

    #[test]
    fn test_build_requires_merchant_id() {
        assert!(Client::builder(ClientConfig::new(""))
            .transport(Arc::new(MockTransport::html("")))
            .build()
            .is_err());
    }
}
