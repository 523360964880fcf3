//! Error types for keystore operations.

use thiserror::Error;

/// Result type alias for keystore operations.
pub type Result<T> = std::result::Result<T, JksError>;

/// Errors that can occur while reading or writing a keystore.
#[derive(Error, Debug)]
pub enum JksError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the JKS magic number.
    #[error("Invalid keystore format: bad magic 0x{0:08X}")]
    BadMagic(u32),

    /// Keystore version other than 1 or 2.
    #[error("Unsupported keystore version: {0}")]
    UnsupportedVersion(u32),

    /// Entry tag is neither a private key nor a trusted certificate.
    #[error("Unknown entry tag: {0}")]
    UnknownTag(u32),

    /// Input ended in the middle of a structure.
    #[error("Keystore data is truncated")]
    Truncated,

    /// A string field is not valid modified UTF-8.
    #[error("Invalid modified UTF-8 string")]
    InvalidUtf8,

    /// A string does not fit into the 16-bit length prefix.
    #[error("String too long to encode: {0} bytes")]
    StringTooLong(usize),

    /// The trailing digest does not match, usually a wrong password.
    #[error("Keystore was tampered with, or password was incorrect")]
    IntegrityCheckFailed,

    /// Attempt to replace a private key entry with a trusted certificate.
    #[error("Cannot overwrite own certificate: alias `{0}` holds a private key")]
    OwnCertificate(String),

    /// Extra bytes after the integrity digest.
    #[error("Unexpected {0} bytes after keystore digest")]
    TrailingData(usize),
}

impl JksError {
    /// Maps an `UnexpectedEof` read error to [`JksError::Truncated`].
    pub(crate) fn from_read(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            JksError::Truncated
        } else {
            JksError::Io(err)
        }
    }
}
