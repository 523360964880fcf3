//! Keystore state shared by the UI and the CLI.
//!
//! [`KeystoreManager`] owns the currently loaded keystore, remembers where it
//! came from and tracks unsaved changes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jks::{Certificate, Entry, Keystore};
use serde::Serialize;
use x509_parser::time::ASN1Time;

use crate::cert::{self, CertDetails, Validity};

/// Kind of keystore entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Trusted certificate entry.
    TrustedCert,
    /// Private key entry with certificate chain.
    PrivateKey,
}

impl EntryKind {
    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::TrustedCert => "trusted cert",
            EntryKind::PrivateKey => "private key",
        }
    }
}

/// One row of the entry table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeystoreEntry {
    /// Entry alias (lower case).
    pub alias: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Certificate subject.
    pub subject: String,
    /// Certificate issuer.
    pub issuer: String,
    /// Start of validity.
    pub start_date: String,
    /// End of validity.
    pub end_date: String,
    /// Validity at listing time.
    pub validity: Validity,
}

/// Everything shown in the details dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryDetails {
    /// The table row.
    pub entry: KeystoreEntry,
    /// Parsed certificate fields.
    pub certificate: CertDetails,
    /// Entry creation date.
    pub created: String,
    /// Number of certificates in the chain (1 for trusted certs).
    pub chain_len: usize,
}

/// Message shown when the load form is incomplete.
pub const MISSING_INPUT: &str = "Please provide both the file and password.";

/// Holds the loaded keystore.
#[derive(Debug, Default)]
pub struct KeystoreManager {
    keystore: Option<Keystore>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl KeystoreManager {
    /// Creates a manager with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and verifies a JKS file.
    ///
    /// # Errors
    ///
    /// Fails on empty input, I/O errors, malformed data or a wrong password.
    /// The previously loaded keystore is kept on failure.
    pub fn load(&mut self, path: impl AsRef<Path>, password: &str) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || password.is_empty() {
            bail!(MISSING_INPUT);
        }

        let keystore = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|data| {
                Keystore::from_bytes(&data, Some(password))
                    .with_context(|| format!("Failed to parse {}", path.display()))
            })
            .inspect_err(|e| error!("Error loading keystore: {e:#}"))?;

        info!(
            "Keystore loaded successfully: {} ({} entries)",
            path.display(),
            keystore.len()
        );
        self.keystore = Some(keystore);
        self.path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Starts a new, empty keystore that will be written to `path`.
    pub fn create(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        info!("Creating new keystore {}", path.display());
        self.keystore = Some(Keystore::new());
        self.path = Some(path.to_path_buf());
        self.dirty = true;
    }

    /// Whether a keystore is loaded.
    pub fn is_loaded(&self) -> bool {
        self.keystore.is_some()
    }

    /// Path the keystore was loaded from.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether there are changes not yet written with [`Self::store`].
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The loaded keystore.
    pub fn keystore(&self) -> Result<&Keystore> {
        self.keystore.as_ref().ok_or(anyhow!("No keystore loaded"))
    }

    fn keystore_mut(&mut self) -> Result<&mut Keystore> {
        self.keystore.as_mut().ok_or(anyhow!("No keystore loaded"))
    }

    /// Lists all entries in alias order.
    ///
    /// Entries whose certificate cannot be parsed are skipped with a warning.
    pub fn entries(&self) -> Result<Vec<KeystoreEntry>> {
        let keystore = self.keystore()?;
        let mut rows = Vec::with_capacity(keystore.len());
        for (alias, entry) in keystore.iter() {
            match row(alias, entry) {
                Ok(r) => rows.push(r),
                Err(e) => warn!("Skipping entry `{alias}`: {e:#}"),
            }
        }
        Ok(rows)
    }

    /// Full details for one entry.
    pub fn details(&self, alias: &str) -> Result<EntryDetails> {
        let keystore = self.keystore()?;
        let entry = keystore
            .get(alias)
            .ok_or_else(|| anyhow!("Alias `{alias}` not found"))?;
        let cert = entry
            .certificate()
            .ok_or_else(|| anyhow!("Entry `{alias}` has no certificate"))?;

        let chain_len = match entry {
            Entry::PrivateKey(key) => key.chain.len(),
            Entry::TrustedCert(_) => 1,
        };
        let created = ASN1Time::from_timestamp((entry.created_ms() / 1000) as i64)
            .map(|t| t.to_string())
            .unwrap_or_else(|_| entry.created_ms().to_string());

        Ok(EntryDetails {
            entry: row(&jks::keystore::normalize_alias(alias), entry)?,
            certificate: cert::inspect(&cert.encoded)?,
            created,
            chain_len,
        })
    }

    /// Removes an entry.
    pub fn delete_entry(&mut self, alias: &str) -> Result<()> {
        let keystore = self.keystore_mut()?;
        if keystore.delete_entry(alias).is_none() {
            bail!("Alias `{alias}` not found");
        }
        info!("Deleted entry `{alias}`");
        self.dirty = true;
        Ok(())
    }

    /// Adds a trusted certificate from DER or PEM bytes.
    ///
    /// Only the first certificate of a PEM bundle is used.
    pub fn add_certificate(&mut self, alias: &str, data: &[u8]) -> Result<KeystoreEntry> {
        let alias = alias.trim();
        if alias.is_empty() {
            bail!("Alias must not be empty");
        }

        let der = cert::parse_certificates(data)?
            .into_iter()
            .next()
            .ok_or(anyhow!("No certificate found in input"))?;

        let keystore = self.keystore_mut()?;
        keystore.set_certificate_entry(alias, Certificate::x509(der))?;
        let entry = keystore
            .get(alias)
            .ok_or_else(|| anyhow!("Alias `{alias}` not found"))?;
        let added = row(&jks::keystore::normalize_alias(alias), entry)?;

        info!("Added certificate `{}`: {}", added.alias, added.subject);
        self.dirty = true;
        Ok(added)
    }

    /// Adds a trusted certificate read from a `.cer`/`.crt`/`.pem` file.
    pub fn add_certificate_file(
        &mut self,
        alias: &str,
        path: impl AsRef<Path>,
    ) -> Result<KeystoreEntry> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        self.add_certificate(alias, &data)
    }

    /// Writes the keystore to `path`, protected by `password`.
    ///
    /// The data goes to a temporary file in the same directory, which then
    /// replaces `path`. An existing file is left intact if writing fails.
    pub fn store(&mut self, path: impl AsRef<Path>, password: &str) -> Result<()> {
        let path = path.as_ref();
        if password.is_empty() {
            bail!("Password must not be empty");
        }
        let data = self.keystore()?.to_bytes(password)?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(&data)
            .and_then(|()| tmp.as_file().sync_all())
            .with_context(|| format!("Failed to write {}", tmp.path().display()))?;
        tmp.persist(path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Keystore written to {}", path.display());
        self.dirty = false;
        Ok(())
    }
}

fn row(alias: &str, entry: &Entry) -> Result<KeystoreEntry> {
    let kind = match entry {
        Entry::PrivateKey(_) => EntryKind::PrivateKey,
        Entry::TrustedCert(_) => EntryKind::TrustedCert,
    };
    let cert = entry
        .certificate()
        .ok_or_else(|| anyhow!("Entry `{alias}` has no certificate"))?;
    let summary = cert::summarize(&cert.encoded)?;
    let validity = summary.validity_now();

    Ok(KeystoreEntry {
        alias: alias.to_string(),
        kind,
        subject: summary.subject,
        issuer: summary.issuer,
        start_date: summary.not_before,
        end_date: summary.not_after,
        validity,
    })
}
