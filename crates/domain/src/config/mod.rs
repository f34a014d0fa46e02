mod directory;
mod node;
mod observability;
mod transport;

pub use directory::*;
pub use node::*;
pub use observability::*;
pub use transport::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::path::Path;

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub node: NodeConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Environment variable overriding `directory.address`.
pub const ENV_DIRECTORY_ADDR: &str = "RD_DIRECTORY_ADDR";
/// Environment variable overriding `node.hw_addr`.
pub const ENV_NODE_HW_ADDR: &str = "RD_NODE_HW_ADDR";

impl Config {
    /// Read and parse a TOML config file.  A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `RD_*` environment overrides on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (env vars in production,
    /// a map in tests).  Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_DIRECTORY_ADDR).filter(|v| !v.is_empty()) {
            self.directory.address = addr;
        }
        if let Some(hw) = lookup(ENV_NODE_HW_ADDR).filter(|v| !v.is_empty()) {
            self.node.hw_addr = hw;
        }
    }

    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.directory.address.parse::<IpAddr>().is_err() {
            errors.push(ConfigError::error(
                "directory.address",
                format!("'{}' is not an IP address", self.directory.address),
            ));
        }

        if self.directory.port == 0 {
            errors.push(ConfigError::error(
                "directory.port",
                "port must be greater than 0",
            ));
        }

        if !self.directory.registration_path.starts_with('/') {
            errors.push(ConfigError::error(
                "directory.registration_path",
                "registration path must start with '/'",
            ));
        }

        if self.node.hw_addr.trim().is_empty() {
            errors.push(ConfigError::error("node.hw_addr", "must not be empty"));
        }

        if self.node.update_sub_path.is_empty() {
            errors.push(ConfigError::error(
                "node.update_sub_path",
                "must not be empty",
            ));
        } else if self.node.update_sub_path.starts_with('/') {
            errors.push(ConfigError::warning(
                "node.update_sub_path",
                "leading '/' will produce a double slash after the session handle",
            ));
        }

        if self.node.event_queue == 0 {
            errors.push(ConfigError::error("node.event_queue", "must be at least 1"));
        }

        if self.transport.ack_timeout_ms == 0 {
            errors.push(ConfigError::error(
                "transport.ack_timeout_ms",
                "must be greater than 0",
            ));
        }

        // Written negated so NaN is rejected too.
        if !(self.transport.backoff_factor >= 1.0) {
            errors.push(ConfigError::error(
                "transport.backoff_factor",
                "must be a number >= 1.0",
            ));
        }

        if self.transport.max_retransmit > 8 {
            errors.push(ConfigError::warning(
                "transport.max_retransmit",
                format!(
                    "{} retransmissions keeps a dead directory blocking for a long time",
                    self.transport.max_retransmit
                ),
            ));
        }

        if self.limits.max_payload_bytes == 0 {
            errors.push(ConfigError::error(
                "limits.max_payload_bytes",
                "must be greater than 0",
            ));
        }

        if self.limits.max_uri_bytes == 0 {
            errors.push(ConfigError::error(
                "limits.max_uri_bytes",
                "must be greater than 0",
            ));
        }

        errors
    }

    /// Convenience: first error-severity issue as an [`Error::Config`].
    pub fn ensure_valid(&self) -> Result<()> {
        match self
            .validate()
            .into_iter()
            .find(|e| e.severity == ConfigSeverity::Error)
        {
            Some(e) => Err(Error::Config(e.to_string())),
            None => Ok(()),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl ConfigError {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}
