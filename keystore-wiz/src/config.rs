//! Application configuration.
//!
//! Configuration is stored in `.keystore-wiz.toml`:
//!
//! ```toml
//! [ui]
//! title = "Keystore Wiz"
//!
//! [keystore]
//! default_path = "certs/truststore.jks"
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".keystore-wiz.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WizConfig {
    /// User interface settings.
    pub ui: UiConfig,
    /// Keystore defaults.
    pub keystore: KeystoreConfig,
}

/// User interface settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Title shown above the load form.
    pub title: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "Keystore Wiz".to_string(),
        }
    }
}

/// Keystore defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Keystore path pre-filled in the load form.
    pub default_path: Option<PathBuf>,
}

impl WizConfig {
    /// Loads configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
    /// `path` is `None`.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!("no {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
