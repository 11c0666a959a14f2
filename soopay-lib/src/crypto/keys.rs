//! RSA key wrappers with PKCS#1 v1.5 sign/verify and encrypt/decrypt.
//!
//! Both types are immutable after construction and safe to share between
//! concurrent calls.

use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::{Result, SoopayError};

/// Digest used before signing or verifying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

impl DigestAlgorithm {
    fn hash(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(message).to_vec(),
            Self::Sha256 => Sha256::digest(message).to_vec(),
        }
    }

    fn scheme(&self) -> Pkcs1v15Sign {
        match self {
            Self::Sha1 => Pkcs1v15Sign::new::<Sha1>(),
            Self::Sha256 => Pkcs1v15Sign::new::<Sha256>(),
        }
    }

    /// Algorithm name as used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
        }
    }
}

/// Merchant private key, optionally paired with its certificate.
#[derive(Clone)]
pub struct PrivateKey {
    inner: RsaPrivateKey,
    certificate_der: Option<Vec<u8>>,
}

impl PrivateKey {
    /// Pair a key with the DER certificate it was issued under.
    pub fn with_certificate(inner: RsaPrivateKey, certificate_der: Vec<u8>) -> Self {
        Self {
            inner,
            certificate_der: Some(certificate_der),
        }
    }

    /// DER certificate the key was loaded with, if any.
    pub fn certificate_der(&self) -> Option<&[u8]> {
        self.certificate_der.as_deref()
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(self.inner.to_public_key())
    }

    /// Hash `message` with `digest` and sign it.
    pub fn sign(&self, digest: DigestAlgorithm, message: &[u8]) -> Result<Vec<u8>> {
        let hashed = digest.hash(message);
        self.inner
            .sign(digest.scheme(), &hashed)
            .map_err(|e| SoopayError::Crypto(format!("RSA signing failed: {}", e)))
    }

    /// Decrypt a PKCS#1 v1.5 ciphertext.
    ///
    /// The plaintext is whatever encoding the gateway used (GBK in practice);
    /// see [`crate::charset`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.inner
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|e| SoopayError::Crypto(format!("RSA decryption failed: {}", e)))
    }
}

impl From<RsaPrivateKey> for PrivateKey {
    fn from(inner: RsaPrivateKey) -> Self {
        Self {
            inner,
            certificate_der: None,
        }
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("has_certificate", &self.certificate_der.is_some())
            .finish_non_exhaustive()
    }
}

/// Gateway public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    inner: RsaPublicKey,
}

impl PublicKey {
    /// Verify `signature` over `message` hashed with `digest`.
    ///
    /// Any mismatch, including a malformed signature, is
    /// [`SoopayError::SignatureInvalid`].
    pub fn verify(&self, digest: DigestAlgorithm, message: &[u8], signature: &[u8]) -> Result<()> {
        let hashed = digest.hash(message);
        self.inner
            .verify(digest.scheme(), &hashed, signature)
            .map_err(|_| SoopayError::SignatureInvalid)
    }

    /// Encrypt with PKCS#1 v1.5 padding.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();
        self.inner
            .encrypt(&mut rng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| SoopayError::Crypto(format!("RSA encryption failed: {}", e)))
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(inner: RsaPublicKey) -> Self {
        Self { inner }
    }
}
