//! Server-side session state bound to one browser.

use std::collections::HashMap;
use std::fmt;
use std::sync::Weak;

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

use crate::error::{Error, Result};
use crate::provider::Provider;

/// A single user's server-side state.
///
/// A session is owned by the [`Provider`] that created it. Every read or
/// write of its payload notifies that provider so the session's recency
/// position and access time stay current; the provider uses both to decide
/// when the session is eligible for garbage collection.
///
/// Values are stored as JSON so any `Serialize` type can be kept; use
/// [`get_as`](Session::get_as) to read them back into a concrete type.
pub struct Session {
    id: String,
    values: RwLock<HashMap<String, Value>>,
    last_accessed: Mutex<Instant>,
    provider: Weak<dyn Provider>,
}

impl Session {
    /// Create an empty session owned by `provider`.
    ///
    /// Providers call this from [`Provider::init`]; handler code obtains
    /// sessions through the [`Manager`](crate::Manager) instead.
    pub fn new(id: impl Into<String>, provider: Weak<dyn Provider>) -> Self {
        Self {
            id: id.into(),
            values: RwLock::new(HashMap::new()),
            last_accessed: Mutex::new(Instant::now()),
            provider,
        }
    }

    /// The session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the session payload was last read or written.
    pub fn last_accessed(&self) -> Instant {
        *self.last_accessed.lock()
    }

    /// Record an access at `now`. Never moves the timestamp backwards.
    pub fn touch(&self, now: Instant) {
        let mut last = self.last_accessed.lock();
        if now > *last {
            *last = now;
        }
    }

    /// Insert or overwrite `key`.
    ///
    /// The value is written even when the recency refresh fails; the error
    /// is still returned so the caller knows the session may have been
    /// destroyed concurrently.
    pub async fn set<T: Serialize + ?Sized>(&self, key: impl Into<String>, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.values.write().await.insert(key.into(), value);
        self.refresh().await
    }

    /// Get the value stored under `key`, or `None` if absent.
    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.refresh().await?;
        Ok(self.values.read().await.get(key).cloned())
    }

    /// Get the value stored under `key` deserialized into `T`.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        self.refresh().await
    }

    /// Keys currently stored, in no particular order.
    pub async fn keys(&self) -> Vec<String> {
        self.values.read().await.keys().cloned().collect()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    /// Check if the payload is empty.
    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }

    async fn refresh(&self) -> Result<()> {
        let provider = self.provider.upgrade().ok_or(Error::ProviderUnavailable)?;
        trace!(session_id = %self.id, "Refreshing session recency");
        provider.update(&self.id).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("last_accessed", &self.last_accessed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;
    use std::time::Duration;

    fn detached(id: &str) -> Session {
        let provider: Weak<dyn Provider> = Weak::<MemoryProvider>::new();
        Session::new(id, provider)
    }

    #[tokio::test]
    async fn test_last_value_wins() {
        let provider = MemoryProvider::new();
        let session = provider.init("s1").await.unwrap();

        session.set("k", "a").await.unwrap();
        session.set("k", "b").await.unwrap();
        assert_eq!(session.get_as::<String>("k").await.unwrap().as_deref(), Some("b"));

        session.delete("k").await.unwrap();
        assert_eq!(session.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_none_not_error() {
        let provider = MemoryProvider::new();
        let session = provider.init("s1").await.unwrap();

        assert!(session.get("nope").await.unwrap().is_none());
        session.delete("nope").await.unwrap();
    }

    #[tokio::test]
    async fn test_typed_values() {
        let provider = MemoryProvider::new();
        let session = provider.init("s1").await.unwrap();

        session.set("count", &3u32).await.unwrap();
        session.set("tags", &vec!["haiku", "tanka"]).await.unwrap();

        assert_eq!(session.get_as::<u32>("count").await.unwrap(), Some(3));
        assert_eq!(
            session.get_as::<Vec<String>>("tags").await.unwrap(),
            Some(vec!["haiku".to_string(), "tanka".to_string()])
        );
        assert!(matches!(
            session.get_as::<u32>("tags").await,
            Err(Error::Serialization(_))
        ));

        let mut keys = session.keys().await;
        keys.sort();
        assert_eq!(keys, vec!["count", "tags"]);
    }

    #[tokio::test]
    async fn test_set_after_destroy_keeps_value_but_reports() {
        let provider = MemoryProvider::new();
        let session = provider.init("s1").await.unwrap();
        provider.destroy("s1").await.unwrap();

        let err = session.set("k", "v").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(session.len().await, 1);
    }

    #[tokio::test]
    async fn test_orphaned_session() {
        let session = detached("s1");
        assert!(matches!(
            session.set("k", "v").await,
            Err(Error::ProviderUnavailable)
        ));
        assert_eq!(session.id(), "s1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_is_monotonic() {
        let session = detached("s1");
        let start = session.last_accessed();

        tokio::time::advance(Duration::from_secs(5)).await;
        session.touch(Instant::now());
        assert_eq!(session.last_accessed(), start + Duration::from_secs(5));

        session.touch(start);
        assert_eq!(session.last_accessed(), start + Duration::from_secs(5));
    }
}
