//! # jks - Java KeyStore Library
//!
//! A Rust library for reading and writing Java KeyStore (JKS) files, the
//! default keystore format of older JDKs and of many `truststore.jks` files
//! still in use.
//!
//! ## Features
//!
//! - Parse version 1 and version 2 JKS files
//! - Trusted certificate and private key entries
//! - Integrity digest verification and generation
//! - Case-insensitive aliases, as the JKS provider treats them
//! - Private keys are kept in protected form and written back unchanged
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jks::{Certificate, Keystore};
//!
//! let data = std::fs::read("truststore.jks").unwrap();
//! let mut keystore = Keystore::from_bytes(&data, Some("changeit")).unwrap();
//!
//! for alias in keystore.aliases() {
//!     println!("{alias}");
//! }
//!
//! let der = std::fs::read("root-ca.der").unwrap();
//! keystore.set_certificate_entry("root-ca", Certificate::x509(der)).unwrap();
//! std::fs::write("truststore.jks", keystore.to_bytes("changeit").unwrap()).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`keystore`] - The in-memory keystore container
//! - [`entry`] - Entry and certificate types
//! - [`digest`] - Integrity digest calculation
//! - [`mutf8`] - Java modified UTF-8 strings
//! - [`error`] - Error types and result definitions

#[macro_use]
extern crate log;

mod codec;

/// Integrity digest calculation.
pub mod digest;

/// Entry and certificate types.
pub mod entry;

/// Error types and result definitions for keystore operations.
pub mod error;

/// The in-memory keystore container.
pub mod keystore;

/// Java modified UTF-8 encoding.
pub mod mutf8;

pub use digest::integrity_digest;
pub use entry::{Certificate, Entry, PrivateKeyEntry, TrustedCertEntry, now_ms};
pub use error::{JksError, Result};
pub use keystore::Keystore;

/// JKS magic number.
pub const JKS_MAGIC: u32 = 0xFEED_FEED;

/// Original format without certificate type strings.
pub const VERSION_1: u32 = 1;

/// Current format, written by this library.
pub const VERSION_2: u32 = 2;

/// Entry tag for a private key with certificate chain.
pub const TAG_PRIVATE_KEY: u32 = 1;

/// Entry tag for a trusted certificate.
pub const TAG_TRUSTED_CERT: u32 = 2;
