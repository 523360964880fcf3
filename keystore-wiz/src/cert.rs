//! X.509 certificate inspection.
//!
//! Turns the DER blobs stored in a keystore into the strings shown in the
//! entry table and the details dialog.

use anyhow::{Context, Result};
use serde::Serialize;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use x509_parser::{
    certificate::X509Certificate,
    objects::{oid_registry, oid2sn},
    oid_registry::Oid,
    parse_x509_certificate,
    pem::Pem,
    x509::X509Name,
};

/// Validity of a certificate at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Validity {
    /// `not_before` is in the future.
    NotYetValid,
    /// Within the validity window.
    Valid,
    /// `not_after` has passed.
    Expired,
}

impl Validity {
    /// Classifies `now` (Unix seconds) against a validity window.
    pub fn at(not_before: i64, not_after: i64, now: i64) -> Self {
        if now < not_before {
            Validity::NotYetValid
        } else if now > not_after {
            Validity::Expired
        } else {
            Validity::Valid
        }
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            Validity::NotYetValid => "not yet valid",
            Validity::Valid => "valid",
            Validity::Expired => "expired",
        }
    }
}

/// The fields shown for every row of the entry table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertSummary {
    /// Subject name, RFC 2253 order.
    pub subject: String,
    /// Issuer name, RFC 2253 order.
    pub issuer: String,
    /// Start of validity, human readable.
    pub not_before: String,
    /// End of validity, human readable.
    pub not_after: String,
    /// Start of validity as Unix seconds.
    pub not_before_ts: i64,
    /// End of validity as Unix seconds.
    pub not_after_ts: i64,
}

impl CertSummary {
    /// Validity status at the current time.
    pub fn validity_now(&self) -> Validity {
        Validity::at(self.not_before_ts, self.not_after_ts, unix_now())
    }
}

/// Full certificate information for the details view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertDetails {
    /// Names and validity.
    #[serde(flatten)]
    pub summary: CertSummary,
    /// X.509 version (1, 2 or 3).
    pub version: u32,
    /// Serial number as colon-separated hex.
    pub serial: String,
    /// Signature algorithm short name, or dotted OID.
    pub signature_algorithm: String,
    /// SHA-1 fingerprint of the DER encoding.
    pub sha1_fingerprint: String,
    /// SHA-256 fingerprint of the DER encoding.
    pub sha256_fingerprint: String,
    /// Subject and issuer are identical.
    pub self_signed: bool,
}

const PEM_CERT_LABELS: &[&str] = &["CERTIFICATE", "X509 CERTIFICATE", "TRUSTED CERTIFICATE"];

/// Extracts DER certificates from a DER file or a PEM bundle.
///
/// # Errors
///
/// Fails when the input holds no parseable certificate.
pub fn parse_certificates(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let looks_like_pem = data
        .windows(b"-----BEGIN".len())
        .any(|w| w == b"-----BEGIN");

    let mut certs = Vec::new();
    if looks_like_pem {
        for pem in Pem::iter_from_buffer(data) {
            let pem = pem.map_err(|e| anyhow!("Invalid PEM data: {e}"))?;
            if !PEM_CERT_LABELS.contains(&pem.label.as_str()) {
                debug!("skipping PEM block `{}`", pem.label);
                continue;
            }
            certs.push(certificate_bytes(&pem.contents)?);
        }
    } else {
        certs.push(certificate_bytes(data)?);
    }

    if certs.is_empty() {
        bail!("No certificate found in input");
    }
    Ok(certs)
}

/// Reads the table fields of a DER certificate.
pub fn summarize(der: &[u8]) -> Result<CertSummary> {
    let cert = parse(der)?;
    Ok(summary_of(&cert))
}

/// Reads all displayable fields of a DER certificate.
pub fn inspect(der: &[u8]) -> Result<CertDetails> {
    let cert = parse(der)?;

    let sig_oid = &cert.signature_algorithm.algorithm;
    let signature_algorithm = oid2sn(sig_oid, oid_registry())
        .map(str::to_string)
        .unwrap_or_else(|_| sig_oid.to_id_string());

    Ok(CertDetails {
        summary: summary_of(&cert),
        version: cert.version().0 + 1,
        serial: cert.raw_serial_as_string(),
        signature_algorithm,
        sha1_fingerprint: colon_hex(&Sha1::digest(der)),
        sha256_fingerprint: colon_hex(&Sha256::digest(der)),
        self_signed: cert.subject().as_raw() == cert.issuer().as_raw(),
    })
}

/// The bytes of the leading certificate, without anything after it.
fn certificate_bytes(data: &[u8]) -> Result<Vec<u8>> {
    let (rest, _) = parse_x509_certificate(data)
        .map_err(|e| anyhow!("{e}"))
        .context("Invalid X.509 certificate")?;
    if !rest.is_empty() {
        debug!("ignoring {} bytes after certificate", rest.len());
    }
    Ok(data[..data.len() - rest.len()].to_vec())
}

fn parse(der: &[u8]) -> Result<X509Certificate<'_>> {
    let (_, cert) = parse_x509_certificate(der)
        .map_err(|e| anyhow!("{e}"))
        .context("Invalid X.509 certificate")?;
    Ok(cert)
}

fn summary_of(cert: &X509Certificate<'_>) -> CertSummary {
    let validity = cert.validity();
    CertSummary {
        subject: rfc2253(cert.subject()),
        issuer: rfc2253(cert.issuer()),
        not_before: validity.not_before.to_string(),
        not_after: validity.not_after.to_string(),
        not_before_ts: validity.not_before.timestamp(),
        not_after_ts: validity.not_after.timestamp(),
    }
}

fn attr_keyword(oid: &Oid<'_>) -> Option<&'static str> {
    let keyword = match oid.to_id_string().as_str() {
        "2.5.4.3" => "CN",
        "2.5.4.6" => "C",
        "2.5.4.7" => "L",
        "2.5.4.8" => "ST",
        "2.5.4.9" => "STREET",
        "2.5.4.10" => "O",
        "2.5.4.11" => "OU",
        "0.9.2342.19200300.100.1.1" => "UID",
        "0.9.2342.19200300.100.1.25" => "DC",
        _ => return None,
    };
    Some(keyword)
}

/// Renders a name the way `X500Principal.getName()` does: last RDN first,
/// no spaces after separators.
pub fn rfc2253(name: &X509Name<'_>) -> String {
    let rdns: Vec<String> = name
        .iter_rdn()
        .map(|rdn| {
            rdn.iter()
                .map(|attr| {
                    let key = attr_keyword(attr.attr_type())
                        .map(str::to_string)
                        .unwrap_or_else(|| attr.attr_type().to_id_string());
                    let value = match attr.as_str() {
                        Ok(s) => escape_value(s),
                        Err(_) => format!("#{}", hex::encode(attr.attr_value().data)),
                    };
                    format!("{key}={value}")
                })
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect();

    rdns.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Escapes an attribute value per RFC 2253 section 2.4.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);
    for (i, c) in value.chars().enumerate() {
        let needs_escape = matches!(c, ',' | '=' | '+' | '<' | '>' | '#' | ';' | '"' | '\\')
            || (i == 0 && c == ' ')
            || (i == last && c == ' ');
        if needs_escape {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Upper-case hex bytes joined by `:`.
pub fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Current time as Unix seconds.
pub fn unix_now() -> i64 {
    (jks::now_ms() / 1000) as i64
}
