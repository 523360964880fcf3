//! Keystore integrity digest.
//!
//! The last 20 bytes of a JKS file are
//! `SHA-1(password as UTF-16BE || "Mighty Aphrodite" || body)`.

use sha1::{Digest, Sha1};

/// Length of the trailing digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// Salt phrase mixed into the digest after the password.
pub const WHITENER: &[u8] = b"Mighty Aphrodite";

/// Converts a password into the byte form used by the digest.
///
/// Each UTF-16 code unit becomes two big-endian bytes.
pub fn password_bytes(password: &str) -> Vec<u8> {
    password
        .encode_utf16()
        .flat_map(|unit| unit.to_be_bytes())
        .collect()
}

/// Computes the integrity digest over `body` for the given password.
pub fn integrity_digest(password: &str, body: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha1::new();
    hasher.update(password_bytes(password));
    hasher.update(WHITENER);
    hasher.update(body);
    hasher.finalize().into()
}
