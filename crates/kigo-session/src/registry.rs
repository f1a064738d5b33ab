//! Named registry of session providers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::memory::MemoryProvider;
use crate::provider::Provider;

/// Backend name of the built-in [`MemoryProvider`].
pub const MEMORY_PROVIDER: &str = "memory";

/// Association of backend names to provider instances.
///
/// Populated once during application bootstrap, then handed to
/// [`Manager::new`](crate::Manager::new), which resolves its provider by
/// name. Registration is write-once per name.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in `"memory"` provider.
    pub fn with_defaults() -> Self {
        let mut providers: HashMap<String, Arc<dyn Provider>> = HashMap::new();
        providers.insert(MEMORY_PROVIDER.to_string(), MemoryProvider::new());
        Self { providers }
    }

    /// Register `provider` under `name`.
    ///
    /// Registering a name twice is a configuration error.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) -> Result<()> {
        let name = name.into();
        if self.providers.contains_key(&name) {
            return Err(Error::DuplicateProvider(name));
        }
        debug!(provider = %name, "Registered session provider");
        self.providers.insert(name, provider);
        Ok(())
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_provider(mut self, name: impl Into<String>, provider: Arc<dyn Provider>) -> Result<Self> {
        self.register(name, provider)?;
        Ok(self)
    }

    /// Look up the provider registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// Check whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Registered backend names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if no providers are registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_include_memory() {
        let registry = ProviderRegistry::with_defaults();
        assert!(registry.contains(MEMORY_PROVIDER));
        assert_eq!(registry.names(), vec!["memory"]);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ProviderRegistry::new();
        registry.register("memory", MemoryProvider::new()).unwrap();

        let err = registry
            .register("memory", MemoryProvider::new())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateProvider(name) if name == "memory"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_returns_registered_instance() {
        let provider = MemoryProvider::new();
        let registry = ProviderRegistry::new()
            .with_provider("memory", provider.clone())
            .unwrap()
            .with_provider("scratch", MemoryProvider::new())
            .unwrap();

        let found = registry.get("memory").unwrap();
        let expected: Arc<dyn Provider> = provider;
        assert!(Arc::ptr_eq(&found, &expected));
        assert!(registry.get("database").is_none());
        assert_eq!(registry.names(), vec!["memory", "scratch"]);
    }
}
