//! # keystore-wiz
//!
//! A terminal wizard for inspecting and editing Java keystores.
//!
//! ## Features
//!
//! - **Load**: open a JKS file and verify it against its password
//! - **Browse**: table of entries with subject, issuer and validity
//! - **Details**: serial, signature algorithm and fingerprints per entry
//! - **Edit**: remove entries and import trusted certificates (DER or PEM)
//! - **Export**: write the keystore, optionally under a new password
//! - **CLI**: the same operations as scriptable subcommands
//!
//! ## Modules
//!
//! - [`cert`] - X.509 certificate inspection
//! - [`cli`] - Command line interface
//! - [`config`] - Configuration file handling
//! - [`manager`] - Loaded keystore state and editing operations
//! - [`ui`] - Cursive-based interactive front-end
//!
//! ## Example
//!
//! ```rust,no_run
//! use keystore_wiz::manager::KeystoreManager;
//!
//! let mut manager = KeystoreManager::new();
//! manager.load("truststore.jks", "changeit").unwrap();
//! for entry in manager.entries().unwrap() {
//!     println!("{} {}", entry.alias, entry.subject);
//! }
//! ```

/// X.509 certificate inspection.
pub mod cert;

/// Command line interface.
pub mod cli;

/// Configuration file handling.
pub mod config;

/// Loaded keystore state and editing operations.
pub mod manager;

/// Interactive terminal front-end.
///
/// Built on Cursive. Logs go to the debug console (`~`) while it runs.
pub mod ui;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
