//! Configuration types.

use std::net::SocketAddr;
use std::time::Duration;

use kigo_session::{DEFAULT_COOKIE_NAME, DEFAULT_MAX_LIFETIME, MEMORY_PROVIDER, ManagerConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Root configuration (`kigo.toml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KigoConfig {
    /// HTTP server configuration.
    pub server: ServerConfig,

    /// Session configuration.
    pub session: SessionConfig,
}

impl KigoConfig {
    /// Create a config with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to, as `host:port`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse the bind address.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        self.bind.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            field: "server.bind".to_string(),
            reason: e.to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Registered provider backing sessions.
    pub provider: String,
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Seconds an unaccessed session survives; also the GC period.
    pub max_lifetime_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: MEMORY_PROVIDER.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_lifetime_secs: DEFAULT_MAX_LIFETIME.as_secs(),
        }
    }
}

impl SessionConfig {
    /// Max lifetime as a duration.
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    /// Manager configuration for this section.
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig::new(&self.provider)
            .with_cookie_name(&self.cookie_name)
            .with_max_lifetime(self.max_lifetime())
    }
}
