//! Keystore entry types.

use std::time::{SystemTime, UNIX_EPOCH};

/// Certificate type string used by X.509 certificates.
pub const X509: &str = "X.509";

/// An encoded certificate as stored in the keystore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// Certificate type, normally `"X.509"`.
    pub cert_type: String,
    /// Encoded certificate (DER for X.509).
    pub encoded: Vec<u8>,
}

impl Certificate {
    /// Creates an X.509 certificate from DER bytes.
    pub fn x509(der: impl Into<Vec<u8>>) -> Self {
        Self {
            cert_type: X509.to_string(),
            encoded: der.into(),
        }
    }
}

/// A trusted certificate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedCertEntry {
    /// Creation date in milliseconds since the Unix epoch.
    pub created_ms: u64,
    /// The trusted certificate.
    pub certificate: Certificate,
}

/// A private key entry with its certificate chain.
///
/// The key stays in its protected (encrypted) form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyEntry {
    /// Creation date in milliseconds since the Unix epoch.
    pub created_ms: u64,
    /// DER-encoded `EncryptedPrivateKeyInfo`.
    pub protected_key: Vec<u8>,
    /// Certificate chain, leaf first.
    pub chain: Vec<Certificate>,
}

/// A keystore entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Private key with certificate chain (tag 1).
    PrivateKey(PrivateKeyEntry),
    /// Trusted certificate (tag 2).
    TrustedCert(TrustedCertEntry),
}

impl Entry {
    /// Tag value written before the alias.
    pub fn tag(&self) -> u32 {
        match self {
            Entry::PrivateKey(_) => crate::TAG_PRIVATE_KEY,
            Entry::TrustedCert(_) => crate::TAG_TRUSTED_CERT,
        }
    }

    /// Creation date in milliseconds since the Unix epoch.
    pub fn created_ms(&self) -> u64 {
        match self {
            Entry::PrivateKey(e) => e.created_ms,
            Entry::TrustedCert(e) => e.created_ms,
        }
    }

    /// The trusted certificate, or the leaf of a key entry's chain.
    pub fn certificate(&self) -> Option<&Certificate> {
        match self {
            Entry::PrivateKey(e) => e.chain.first(),
            Entry::TrustedCert(e) => Some(&e.certificate),
        }
    }
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
