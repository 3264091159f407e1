//! Adapter configuration loaded from a YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! usable configuration.

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error while reading the configuration file.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Storage backend connection.
    pub storage: StorageConfig,
    /// HTTP listener.
    pub http: HttpConfig,
}

/// Storage backend connection settings.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Connection string of the backend cluster.
    pub conn_string: String,
    pub username: String,
    pub password: String,
    /// Collection (bucket) samples are written to and read from.
    pub bucket: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            conn_string: "couchbase://localhost".to_string(),
            username: String::new(),
            password: String::new(),
            bucket: "default".to_string(),
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("conn_string", &self.conn_string)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("bucket", &self.bucket)
            .finish()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Address to listen on.
    pub listen: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { listen: "127.0.0.1:9201".to_string() }
    }
}

impl AdapterConfig {
    /// Load the configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let txt = fs::read_to_string(path)?;
        Self::from_yaml(&txt)
    }

    /// Parse the configuration from YAML text.
    pub fn from_yaml(txt: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as null, not as an empty map.
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(txt)?)
    }
}
