//! JKS binary reader and writer.
//!
//! All integers are big-endian. Layout:
//!
//! ```text
//! u32 magic (0xFEEDFEED)  u32 version  u32 count
//! entry* : u32 tag, utf alias, u64 created_ms, body
//!   tag 1: u32 len, key bytes, u32 chain_len, cert*
//!   tag 2: cert
//! cert   : [utf type (v2 only)], u32 len, bytes
//! [20] integrity digest
//! ```

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::digest::{DIGEST_LEN, integrity_digest};
use crate::entry::{Certificate, Entry, PrivateKeyEntry, TrustedCertEntry, X509};
use crate::error::{JksError, Result};
use crate::keystore::Keystore;
use crate::{JKS_MAGIC, TAG_PRIVATE_KEY, TAG_TRUSTED_CERT, VERSION_1, VERSION_2};

struct Reader<'a> {
    cur: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            cur: Cursor::new(data),
        }
    }

    fn position(&self) -> usize {
        self.cur.position() as usize
    }

    fn remaining(&self) -> usize {
        self.cur.get_ref().len().saturating_sub(self.position())
    }

    fn u32(&mut self) -> Result<u32> {
        self.cur
            .read_u32::<BigEndian>()
            .map_err(JksError::from_read)
    }

    fn u64(&mut self) -> Result<u64> {
        self.cur
            .read_u64::<BigEndian>()
            .map_err(JksError::from_read)
    }

    fn bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        // Length fields are untrusted; never allocate past the input.
        if len > self.remaining() {
            return Err(JksError::Truncated);
        }
        let mut buf = vec![0u8; len];
        self.cur.read_exact(&mut buf).map_err(JksError::from_read)?;
        Ok(buf)
    }

    fn utf(&mut self) -> Result<String> {
        let len = self
            .cur
            .read_u16::<BigEndian>()
            .map_err(JksError::from_read)?;
        let raw = self.bytes(len as usize)?;
        crate::mutf8::decode(&raw)
    }

    fn certificate(&mut self, version: u32) -> Result<Certificate> {
        let cert_type = if version == VERSION_2 {
            self.utf()?
        } else {
            X509.to_string()
        };
        let len = self.u32()? as usize;
        let encoded = self.bytes(len)?;
        Ok(Certificate { cert_type, encoded })
    }
}

/// Parses a complete keystore file.
pub(crate) fn decode(data: &[u8], password: Option<&str>) -> Result<Keystore> {
    let mut r = Reader::new(data);

    let magic = r.u32()?;
    if magic != JKS_MAGIC {
        return Err(JksError::BadMagic(magic));
    }
    let version = r.u32()?;
    if version != VERSION_1 && version != VERSION_2 {
        return Err(JksError::UnsupportedVersion(version));
    }
    let count = r.u32()?;
    trace!("jks v{version}, {count} entries");

    let mut keystore = Keystore::new();
    for _ in 0..count {
        let tag = r.u32()?;
        let alias = r.utf()?;
        let created_ms = r.u64()?;

        let entry = match tag {
            TAG_PRIVATE_KEY => {
                let key_len = r.u32()? as usize;
                let protected_key = r.bytes(key_len)?;
                let chain_len = r.u32()?;
                let mut chain = Vec::new();
                for _ in 0..chain_len {
                    chain.push(r.certificate(version)?);
                }
                Entry::PrivateKey(PrivateKeyEntry {
                    created_ms,
                    protected_key,
                    chain,
                })
            }
            TAG_TRUSTED_CERT => Entry::TrustedCert(TrustedCertEntry {
                created_ms,
                certificate: r.certificate(version)?,
            }),
            other => return Err(JksError::UnknownTag(other)),
        };
        keystore.insert(&alias, entry);
    }

    let body_end = r.position();
    let stored = r.bytes(DIGEST_LEN)?;
    if r.remaining() > 0 {
        return Err(JksError::TrailingData(r.remaining()));
    }

    if let Some(password) = password {
        let computed = integrity_digest(password, &data[..body_end]);
        if computed[..] != stored[..] {
            return Err(JksError::IntegrityCheckFailed);
        }
    }

    Ok(keystore)
}

fn write_utf(out: &mut Vec<u8>, s: &str) -> Result<()> {
    let encoded = crate::mutf8::encode(s)?;
    out.write_u16::<BigEndian>(encoded.len() as u16)?;
    out.extend_from_slice(&encoded);
    Ok(())
}

fn write_len(out: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "entry too large"))?;
    out.write_u32::<BigEndian>(len)?;
    Ok(())
}

fn write_certificate(out: &mut Vec<u8>, cert: &Certificate) -> Result<()> {
    write_utf(out, &cert.cert_type)?;
    write_len(out, cert.encoded.len())?;
    out.extend_from_slice(&cert.encoded);
    Ok(())
}

/// Serialises a keystore as version 2 and appends the digest.
pub(crate) fn encode(keystore: &Keystore, password: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.write_u32::<BigEndian>(JKS_MAGIC)?;
    out.write_u32::<BigEndian>(VERSION_2)?;
    write_len(&mut out, keystore.len())?;

    for (alias, entry) in keystore.iter() {
        out.write_u32::<BigEndian>(entry.tag())?;
        write_utf(&mut out, alias)?;
        out.write_u64::<BigEndian>(entry.created_ms())?;

        match entry {
            Entry::PrivateKey(key) => {
                write_len(&mut out, key.protected_key.len())?;
                out.extend_from_slice(&key.protected_key);
                write_len(&mut out, key.chain.len())?;
                for cert in &key.chain {
                    write_certificate(&mut out, cert)?;
                }
            }
            Entry::TrustedCert(trusted) => {
                write_certificate(&mut out, &trusted.certificate)?;
            }
        }
    }

    let digest = integrity_digest(password, &out);
    out.extend_from_slice(&digest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-assembled v2 store with one trusted cert `ca` and password `changeit`.
    fn sample_v2() -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&0xFEEDFEEDu32.to_be_bytes());
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&1u32.to_be_bytes());
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x02, b'c', b'a']);
        body.extend_from_slice(&1_700_000_000_000u64.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x05]);
        body.extend_from_slice(b"X.509");
        body.extend_from_slice(&3u32.to_be_bytes());
        body.extend_from_slice(&[0x30, 0x01, 0x00]);
        let digest = integrity_digest("changeit", &body);
        body.extend_from_slice(&digest);
        body
    }

    #[test]
    fn test_decode_hand_built_store() {
        let ks = decode(&sample_v2(), Some("changeit")).unwrap();
        assert_eq!(ks.len(), 1);

        let Some(Entry::TrustedCert(entry)) = ks.get("ca") else {
            panic!("expected trusted cert entry");
        };
        assert_eq!(entry.created_ms, 1_700_000_000_000);
        assert_eq!(entry.certificate.cert_type, "X.509");
        assert_eq!(entry.certificate.encoded, [0x30, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_reproduces_hand_built_store() {
        let data = sample_v2();
        let ks = decode(&data, Some("changeit")).unwrap();
        assert_eq!(encode(&ks, "changeit").unwrap(), data);
    }

    #[test]
    fn test_wrong_password() {
        let err = decode(&sample_v2(), Some("secret")).unwrap_err();
        assert!(matches!(err, JksError::IntegrityCheckFailed));
    }

    #[test]
    fn test_no_password_skips_check() {
        let ks = decode(&sample_v2(), None).unwrap();
        assert!(ks.is_certificate_entry("CA"));
    }

    #[test]
    fn test_bad_magic() {
        let mut data = sample_v2();
        data[..4].copy_from_slice(&0xCECECECEu32.to_be_bytes());
        assert!(matches!(
            decode(&data, None),
            Err(JksError::BadMagic(0xCECECECE))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let mut data = sample_v2();
        data[4..8].copy_from_slice(&3u32.to_be_bytes());
        assert!(matches!(
            decode(&data, None),
            Err(JksError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_truncated_everywhere() {
        let data = sample_v2();
        for len in 0..data.len() {
            let res = decode(&data[..len], None);
            assert!(
                matches!(res, Err(JksError::Truncated)),
                "length {len}: {res:?}"
            );
        }
    }

    #[test]
    fn test_trailing_data() {
        let mut data = sample_v2();
        data.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode(&data, Some("changeit")),
            Err(JksError::TrailingData(2))
        ));
    }

    #[test]
    fn test_unknown_tag() {
        let mut data = sample_v2();
        data[12..16].copy_from_slice(&3u32.to_be_bytes());
        assert!(matches!(decode(&data, None), Err(JksError::UnknownTag(3))));
    }

    #[test]
    fn test_version_1_has_no_cert_type() {
        let mut body = Vec::new();
        body.extend_from_slice(&0xFEEDFEEDu32.to_be_bytes());
        body.extend_from_slice(&1u32.to_be_bytes());
        body.extend_from_slice(&1u32.to_be_bytes());
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&[0x00, 0x01, b'x']);
        body.extend_from_slice(&0u64.to_be_bytes());
        body.extend_from_slice(&2u32.to_be_bytes());
        body.extend_from_slice(&[0xAA, 0xBB]);
        let digest = integrity_digest("pw", &body);
        body.extend_from_slice(&digest);

        let ks = decode(&body, Some("pw")).unwrap();
        let cert = ks.certificate("x").unwrap();
        assert_eq!(cert.cert_type, "X.509");
        assert_eq!(cert.encoded, [0xAA, 0xBB]);
    }

    #[test]
    fn test_private_key_entry_preserved() {
        let mut ks = Keystore::new();
        ks.insert(
            "server",
            Entry::PrivateKey(PrivateKeyEntry {
                created_ms: 42,
                protected_key: vec![0x30, 0x03, 0x01, 0x02, 0x03],
                chain: vec![
                    Certificate::x509(vec![0x01]),
                    Certificate::x509(vec![0x02, 0x03]),
                ],
            }),
        );
        ks.set_certificate_entry("root", Certificate::x509(vec![0x04]))
            .unwrap();

        let data = encode(&ks, "storepass").unwrap();
        let loaded = decode(&data, Some("storepass")).unwrap();
        assert_eq!(loaded, ks);
    }
}
