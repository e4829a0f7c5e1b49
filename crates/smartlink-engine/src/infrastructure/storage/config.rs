//! TOML-based configuration for the provisioning engine.
//!
//! Persists the settings that vary per deployment — region, device
//! timezone, and broadcast addressing — while the protocol constants
//! (wake pattern, pass counts, delay ramp) stay hard-coded where they
//! belong: they are wire-compatibility contracts, not configuration.
//!
//! ```toml
//! region = "AZ"
//! timezone = "-05:00"
//!
//! [network]
//! source_port = 63145
//! target_port = 30011
//! broadcast_address = "255.255.255.255"
//! ```
//!
//! Fields carry `#[serde(default = ...)]` so a partial or absent file
//! still yields a working configuration.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::broadcast::{BroadcastConfig, SOURCE_PORT, TARGET_PORT};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The broadcast address is not a valid IP address.
    #[error("invalid broadcast address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Top-level engine configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkConfig {
    /// Region tokens are issued for (AZ=Americas, AY=Asia, EU=Europe).
    #[serde(default = "default_region")]
    pub region: String,
    /// Timezone reported when requesting a token.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Broadcast addressing.
    #[serde(default)]
    pub network: NetworkSettings,
}

/// Port and address settings for the broadcast session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSettings {
    /// Local UDP port the sender binds.
    #[serde(default = "default_source_port")]
    pub source_port: u16,
    /// Destination UDP port listening devices observe.
    #[serde(default = "default_target_port")]
    pub target_port: u16,
    /// Destination address. `"255.255.255.255"` is the limited broadcast
    /// address.
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_region() -> String {
    "AZ".to_string()
}
fn default_timezone() -> String {
    "-05:00".to_string()
}
fn default_source_port() -> u16 {
    SOURCE_PORT
}
fn default_target_port() -> u16 {
    TARGET_PORT
}
fn default_broadcast_address() -> String {
    "255.255.255.255".to_string()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            timezone: default_timezone(),
            network: NetworkSettings::default(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            source_port: default_source_port(),
            target_port: default_target_port(),
            broadcast_address: default_broadcast_address(),
        }
    }
}

impl LinkConfig {
    /// Loads a config from `path`, returning defaults if the file does not
    /// exist yet.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] for file-system errors other than "not found",
    /// [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    /// Persists the config to `path`, creating parent directories as
    /// needed.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] for file-system failures,
    /// [`ConfigError::Serialize`] if serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves the network settings into a [`BroadcastConfig`].
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidAddress`] if the broadcast address does not
    /// parse as an IP address.
    pub fn broadcast_config(&self) -> Result<BroadcastConfig, ConfigError> {
        let broadcast_address: IpAddr =
            self.network
                .broadcast_address
                .parse()
                .map_err(|source| ConfigError::InvalidAddress {
                    value: self.network.broadcast_address.clone(),
                    source,
                })?;

        Ok(BroadcastConfig {
            source_port: self.network.source_port,
            target_port: self.network.target_port,
            broadcast_address,
        })
    }
}
