//! Configuration for the session manager.

use std::time::Duration;

use crate::registry::MEMORY_PROVIDER;

/// Default cookie carrying the session id.
pub const DEFAULT_COOKIE_NAME: &str = "kigo_session";

/// Default max lifetime of an unaccessed session (1 hour).
pub const DEFAULT_MAX_LIFETIME: Duration = Duration::from_secs(3600);

/// Configuration for a [`Manager`](crate::Manager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Name of the registered provider backing the manager.
    pub provider: String,

    /// Name of the cookie carrying the session id.
    pub cookie_name: String,

    /// Sessions not accessed within this duration are garbage collected.
    /// Also used as the cookie `Max-Age` and the GC period.
    pub max_lifetime: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            provider: MEMORY_PROVIDER.to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_lifetime: DEFAULT_MAX_LIFETIME,
        }
    }
}

impl ManagerConfig {
    /// Create a configuration for the given provider name.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// Set the max lifetime.
    pub fn with_max_lifetime(mut self, max_lifetime: Duration) -> Self {
        self.max_lifetime = max_lifetime;
        self
    }

    /// Set the max lifetime in whole seconds.
    pub fn with_max_lifetime_secs(self, secs: u64) -> Self {
        self.with_max_lifetime(Duration::from_secs(secs))
    }
}
