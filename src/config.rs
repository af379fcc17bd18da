//! # Configuration Management
//!
//! Centralized configuration for the relay.
//!
//! Three peers are configured before the relay starts: the flight controller
//! endpoint, the local listen endpoint the GCS sends to, and the ground
//! control endpoint replies are forwarded to.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()` / `from_toml()`
//! - JSON files via `from_file()` / `from_json()` (recorder-config compatible)
//! - Environment-specific overrides via `from_env()`
//!
//! Addresses are plain IP literals; name resolution is out of scope for a
//! pass-through relay.

use crate::error::{RelayError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::Level;

/// Main relay configuration: the three peers plus logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Flight controller endpoint (forward target for GCS traffic)
    #[serde(default = "PeerConfig::default_fc")]
    pub fc: PeerConfig,

    /// Local listen endpoint (where the GCS first talks to the relay)
    #[serde(default = "PeerConfig::default_listen")]
    pub listen: PeerConfig,

    /// Ground control endpoint (forward target for FC traffic)
    #[serde(default = "PeerConfig::default_gcs")]
    pub gcs: PeerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            fc: PeerConfig::default_fc(),
            listen: PeerConfig::default_listen(),
            gcs: PeerConfig::default_gcs(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from a TOML or JSON file, chosen by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(&path)
            .map_err(|e| RelayError::Config(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {e}")))?;

        let is_json = path
            .as_ref()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_toml(&contents)
        }
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| RelayError::Config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str::<Self>(content)
            .map_err(|e| RelayError::Config(format!("Failed to parse JSON: {e}")))
    }

    /// Load defaults, then apply environment variable overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    /// Override peers from `MAVLINK_RELAY_{FC,LISTEN,GCS}` (`ip:port`).
    pub fn apply_env(&mut self) {
        for (var, peer) in [
            ("MAVLINK_RELAY_FC", &mut self.fc),
            ("MAVLINK_RELAY_LISTEN", &mut self.listen),
            ("MAVLINK_RELAY_GCS", &mut self.gcs),
        ] {
            if let Ok(value) = std::env::var(var) {
                if let Ok(addr) = value.parse::<SocketAddr>() {
                    peer.address = addr.ip().to_string();
                    peer.port = addr.port();
                }
            }
        }
    }

    /// Generate example configuration file content.
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Validate the configuration for common issues and misconfigurations.
    ///
    /// Returns a list of validation errors. Empty list means configuration is
    /// valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.fc.validate("fc"));
        errors.extend(self.listen.validate("listen"));
        errors.extend(self.gcs.validate("gcs"));

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RelayError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// One peer: an IP address plus a UDP port.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeerConfig {
    /// IP address literal (e.g., "127.0.0.1")
    pub address: String,

    /// UDP port
    pub port: u16,
}

impl PeerConfig {
    fn default_fc() -> Self {
        Self {
            address: String::from("127.0.0.1"),
            port: 14540,
        }
    }

    fn default_listen() -> Self {
        Self {
            address: String::from("0.0.0.0"),
            port: 14550,
        }
    }

    fn default_gcs() -> Self {
        Self {
            address: String::from("127.0.0.1"),
            port: 14555,
        }
    }

    /// Resolve to a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip = self.address.parse::<IpAddr>().map_err(|_| {
            RelayError::Config(format!("Invalid IP address: '{}'", self.address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Validate one peer section.
    pub fn validate(&self, name: &str) -> Vec<String> {
        let mut errors = Vec::new();

        if self.address.is_empty() {
            errors.push(format!("Peer '{name}': address cannot be empty"));
        } else if self.address.parse::<IpAddr>().is_err() {
            errors.push(format!(
                "Peer '{name}': invalid IP address '{}' (expected e.g. '127.0.0.1')",
                self.address
            ));
        }

        if self.port == 0 {
            errors.push(format!("Peer '{name}': port must be greater than 0"));
        }

        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
