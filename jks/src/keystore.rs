//! In-memory keystore container.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use crate::codec;
use crate::entry::{Certificate, Entry, TrustedCertEntry, now_ms};
use crate::error::{JksError, Result};

/// A Java KeyStore held in memory.
///
/// Aliases are case-insensitive: they are lower-cased on every insertion
/// and lookup, matching the JKS provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keystore {
    entries: BTreeMap<String, Entry>,
}

/// Normalises an alias the way the JKS provider does.
pub fn normalize_alias(alias: &str) -> String {
    alias.to_lowercase()
}

impl Keystore {
    /// Creates an empty keystore.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a keystore from bytes.
    ///
    /// When `password` is `Some`, the trailing digest is verified and a
    /// mismatch yields [`JksError::IntegrityCheckFailed`]. `None` skips the
    /// check.
    pub fn from_bytes(data: &[u8], password: Option<&str>) -> Result<Self> {
        codec::decode(data, password)
    }

    /// Reads the whole stream and parses it as a keystore.
    pub fn load<R: Read>(reader: &mut R, password: Option<&str>) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data, password)
    }

    /// Serialises the keystore, protected by `password`.
    pub fn to_bytes(&self, password: &str) -> Result<Vec<u8>> {
        codec::encode(self, password)
    }

    /// Writes the serialised keystore to `writer`.
    pub fn store<W: Write>(&self, writer: &mut W, password: &str) -> Result<()> {
        let data = self.to_bytes(password)?;
        writer.write_all(&data)?;
        writer.flush()?;
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the keystore has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All aliases in sorted order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(alias, entry)` pairs in alias order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Looks up an entry by alias.
    pub fn get(&self, alias: &str) -> Option<&Entry> {
        self.entries.get(&normalize_alias(alias))
    }

    /// Whether the alias exists.
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    /// Whether the alias holds a trusted certificate.
    pub fn is_certificate_entry(&self, alias: &str) -> bool {
        matches!(self.get(alias), Some(Entry::TrustedCert(_)))
    }

    /// Whether the alias holds a private key.
    pub fn is_key_entry(&self, alias: &str) -> bool {
        matches!(self.get(alias), Some(Entry::PrivateKey(_)))
    }

    /// Certificate for the alias: the trusted certificate, or the leaf of a
    /// key entry's chain.
    pub fn certificate(&self, alias: &str) -> Option<&Certificate> {
        self.get(alias).and_then(Entry::certificate)
    }

    /// Inserts or replaces a trusted certificate entry.
    ///
    /// # Errors
    ///
    /// Returns [`JksError::OwnCertificate`] if the alias holds a private key.
    pub fn set_certificate_entry(&mut self, alias: &str, certificate: Certificate) -> Result<()> {
        let alias = normalize_alias(alias);
        if let Some(Entry::PrivateKey(_)) = self.entries.get(&alias) {
            return Err(JksError::OwnCertificate(alias));
        }
        debug!("set certificate entry `{alias}`");
        self.entries.insert(
            alias,
            Entry::TrustedCert(TrustedCertEntry {
                created_ms: now_ms(),
                certificate,
            }),
        );
        Ok(())
    }

    /// Inserts an entry as-is, replacing any existing entry for the alias.
    pub fn insert(&mut self, alias: &str, entry: Entry) -> Option<Entry> {
        self.entries.insert(normalize_alias(alias), entry)
    }

    /// Removes an entry, returning it if it existed.
    pub fn delete_entry(&mut self, alias: &str) -> Option<Entry> {
        let removed = self.entries.remove(&normalize_alias(alias));
        if removed.is_some() {
            debug!("deleted entry `{alias}`");
        }
        removed
    }
}
