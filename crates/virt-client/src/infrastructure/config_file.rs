//! Optional TOML configuration file.
//!
//! Every key is optional; an absent key leaves the built-in default (or a
//! command-line flag) in charge.
//!
//! ```toml
//! server = "https://api.cluster.local:6443"
//! token = "eyJhbGciOi..."
//! namespace = "default"
//! connect_timeout_secs = 10
//! request_timeout_secs = 30
//! close_timeout_ms = 2000
//! chunk_size = 32768
//! ```
//!
//! Precedence is command line, then this file, then [`ClientConfig::default`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ClientConfig;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk configuration schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URL of the API server.
    #[serde(default)]
    pub server: Option<String>,
    /// Bearer token.
    #[serde(default)]
    pub token: Option<String>,
    /// Namespace used when none is given on the command line.
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub close_timeout_ms: Option<u64>,
    /// Maximum payload of one outbound console message.
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

impl ConfigFile {
    /// Applies every key present in the file on top of `base`.
    pub fn apply_to(&self, mut base: ClientConfig) -> ClientConfig {
        if let Some(server) = &self.server {
            base.server = server.clone();
        }
        if let Some(token) = &self.token {
            base.token = Some(token.clone());
        }
        if let Some(secs) = self.connect_timeout_secs {
            base.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            base.request_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.close_timeout_ms {
            base.close_timeout = Duration::from_millis(ms);
        }
        if let Some(chunk_size) = self.chunk_size {
            base.chunk_size = chunk_size;
        }
        base
    }
}

/// Parses a configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
pub fn parse_config(content: &str) -> Result<ConfigFile, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Reads and parses the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (including when it
/// does not exist; the path was asked for explicitly) and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
