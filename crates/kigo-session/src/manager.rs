//! Session manager used by request handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::cookies;
use crate::error::{Error, Result};
use crate::id::generate_session_id;
use crate::provider::Provider;
use crate::registry::ProviderRegistry;
use crate::session::Session;

/// Binds browser cookies to provider-held sessions.
///
/// Handlers call [`session_start`](Self::session_start) to get the session
/// for a request (creating one and setting the cookie on first contact) and
/// [`session_destroy`](Self::session_destroy) to log out. A background task
/// started with [`spawn_gc`](Self::spawn_gc) sweeps expired sessions.
pub struct Manager {
    provider: Arc<dyn Provider>,
    config: ManagerConfig,
    lock: Mutex<()>,
}

impl Manager {
    /// Create a manager backed by the provider registered under
    /// `config.provider`.
    pub fn new(registry: &ProviderRegistry, config: ManagerConfig) -> Result<Self> {
        let provider = registry
            .get(&config.provider)
            .ok_or_else(|| Error::UnknownProvider(config.provider.clone()))?;
        Self::with_provider(provider, config)
    }

    /// Create a manager around an explicit provider.
    pub fn with_provider(provider: Arc<dyn Provider>, config: ManagerConfig) -> Result<Self> {
        if !cookies::is_valid_cookie_name(&config.cookie_name) {
            return Err(Error::Config(format!(
                "invalid cookie name {:?}",
                config.cookie_name
            )));
        }
        // Cookie Max-Age has whole-second resolution.
        if config.max_lifetime < Duration::from_secs(1) {
            return Err(Error::Config(format!(
                "max lifetime must be at least one second, got {:?}",
                config.max_lifetime
            )));
        }

        Ok(Self {
            provider,
            config,
            lock: Mutex::new(()),
        })
    }

    /// The manager configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The provider holding this manager's sessions.
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// Max lifetime of an unaccessed session.
    pub fn max_lifetime(&self) -> Duration {
        self.config.max_lifetime
    }

    /// Session id carried by the request cookie, if any.
    ///
    /// An absent or empty cookie yields `None`; a value that cannot be
    /// unescaped is an error.
    pub fn session_id_from(&self, request: &HeaderMap) -> Result<Option<String>> {
        match cookies::find_cookie(request, &self.config.cookie_name) {
            Some(raw) if !raw.is_empty() => cookies::decode_value(&raw).map(Some),
            _ => Ok(None),
        }
    }

    /// Get the session for a request, creating one on first contact.
    ///
    /// When the request carries no session cookie, a new id is generated,
    /// a session is initialised under it, and a `Set-Cookie` header is added
    /// to `response`. Otherwise the session named by the cookie is read
    /// (and recreated if the provider no longer knows it).
    pub async fn session_start(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<Arc<Session>> {
        let _guard = self.lock.lock().await;

        match self.session_id_from(request)? {
            Some(id) => self.provider.read(&id).await,
            None => {
                let id = generate_session_id();
                let session = self.provider.init(&id).await?;
                let cookie = cookies::session_cookie(
                    &self.config.cookie_name,
                    &id,
                    self.config.max_lifetime,
                );
                cookies::set_cookie(response, &cookie)?;
                debug!(session_id = %id, "Started new session");
                Ok(session)
            }
        }
    }

    /// Destroy the request's session and expire its cookie.
    ///
    /// Missing sessions and storage failures are logged, never returned, so
    /// logout always succeeds from the browser's point of view. A request
    /// without a session cookie is a no-op.
    pub async fn session_destroy(
        &self,
        request: &HeaderMap,
        response: &mut HeaderMap,
    ) -> Result<()> {
        let id = match self.session_id_from(request) {
            Ok(Some(id)) => Some(id),
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(error = %e, "Discarding undecodable session cookie");
                None
            }
        };

        self.expire(id.as_deref(), response).await
    }

    /// Destroy the session `id` and expire its cookie.
    ///
    /// For handlers that already hold the session, including one created
    /// earlier in the same request whose cookie the browser has not yet
    /// seen. Pass a fresh `response` map so no earlier `Set-Cookie` for the
    /// session survives.
    pub async fn session_destroy_id(&self, id: &str, response: &mut HeaderMap) -> Result<()> {
        self.expire(Some(id), response).await
    }

    async fn expire(&self, id: Option<&str>, response: &mut HeaderMap) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(id) = id {
            match self.provider.destroy(id).await {
                Ok(()) => debug!(session_id = %id, "Session destroyed"),
                Err(Error::NotFound(_)) => {
                    warn!(session_id = %id, "Destroy requested for unknown session")
                }
                Err(e) => warn!(session_id = %id, error = %e, "Failed to destroy session"),
            }
        }

        cookies::set_cookie(response, &cookies::removal_cookie(&self.config.cookie_name))
    }

    /// Run one garbage-collection sweep.
    ///
    /// Returns the number of sessions removed. Provider errors are logged
    /// and reported as zero removals.
    pub async fn gc(&self) -> usize {
        let _guard = self.lock.lock().await;

        match self.provider.collect_expired(self.config.max_lifetime).await {
            Ok(collected) => collected,
            Err(e) => {
                warn!(error = %e, "Session garbage collection failed");
                0
            }
        }
    }

    /// Spawn the garbage-collection loop.
    ///
    /// Sweeps immediately, then again `max_lifetime` after each sweep
    /// finishes, for as long as the runtime lives.
    pub fn spawn_gc(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        info!(
            interval_secs = manager.config.max_lifetime.as_secs(),
            "Starting session garbage collection"
        );
        tokio::spawn(async move {
            loop {
                manager.gc().await;
                tokio::time::sleep(manager.config.max_lifetime).await;
            }
        })
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;
    use crate::registry::MEMORY_PROVIDER;
    use axum::http::HeaderValue;
    use axum::http::header::{COOKIE, SET_COOKIE};

    fn manager() -> Manager {
        let registry = ProviderRegistry::with_defaults();
        Manager::new(
            &registry,
            ManagerConfig::new(MEMORY_PROVIDER).with_cookie_name("sid"),
        )
        .unwrap()
    }

    fn replay(response: &HeaderMap) -> HeaderMap {
        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_str(pair).unwrap());
        request
    }

    #[test]
    fn test_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = Manager::new(&registry, ManagerConfig::new("database")).unwrap_err();
        assert!(matches!(err, Error::UnknownProvider(name) if name == "database"));
    }

    #[test]
    fn test_rejects_bad_config() {
        let registry = ProviderRegistry::with_defaults();
        assert!(matches!(
            Manager::new(&registry, ManagerConfig::default().with_cookie_name("a b")),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Manager::new(&registry, ManagerConfig::default().with_max_lifetime_secs(0)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_rejects_sub_second_lifetime() {
        let registry = ProviderRegistry::with_defaults();
        let config = ManagerConfig::default().with_max_lifetime(Duration::from_millis(500));
        assert!(matches!(Manager::new(&registry, config), Err(Error::Config(_))));

        let config = ManagerConfig::default().with_max_lifetime(Duration::from_secs(1));
        assert!(Manager::new(&registry, config).is_ok());
    }

    #[tokio::test]
    async fn test_session_cookie_outlives_request() {
        let manager = manager();
        let mut response = HeaderMap::new();
        manager.session_start(&HeaderMap::new(), &mut response).await.unwrap();

        let set_cookie = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=3600"));
    }

    #[tokio::test]
    async fn test_start_without_cookie_sets_one() {
        let manager = manager();
        let mut response = HeaderMap::new();

        let session = manager.session_start(&HeaderMap::new(), &mut response).await.unwrap();

        let request = replay(&response);
        assert_eq!(manager.session_id_from(&request).unwrap().as_deref(), Some(session.id()));
        assert!(manager.provider().contains(session.id()).await);
    }

    #[tokio::test]
    async fn test_cookie_round_trip_reuses_session() {
        let manager = manager();
        let mut first = HeaderMap::new();
        let session = manager.session_start(&HeaderMap::new(), &mut first).await.unwrap();
        session.set("user", "issa").await.unwrap();

        let mut second = HeaderMap::new();
        let again = manager.session_start(&replay(&first), &mut second).await.unwrap();

        assert_eq!(again.id(), session.id());
        assert!(second.get(SET_COOKIE).is_none());
        assert_eq!(again.get_as::<String>("user").await.unwrap().as_deref(), Some("issa"));
        assert_eq!(manager.provider().len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_cookie_id_is_reused() {
        let manager = manager();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("sid=issued-elsewhere"));
        let mut response = HeaderMap::new();

        let session = manager.session_start(&request, &mut response).await.unwrap();

        assert_eq!(session.id(), "issued-elsewhere");
        assert!(response.get(SET_COOKIE).is_none());
        assert!(manager.provider().contains("issued-elsewhere").await);
        assert_eq!(manager.provider().len().await, 1);
    }

    #[tokio::test]
    async fn test_empty_cookie_counts_as_absent() {
        let manager = manager();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("sid="));
        let mut response = HeaderMap::new();

        manager.session_start(&request, &mut response).await.unwrap();
        assert!(response.get(SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_request_error() {
        let manager = manager();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("sid=%FF"));

        let err = manager.session_start(&request, &mut HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, Error::MalformedCookie(_)));
    }

    #[tokio::test]
    async fn test_destroy_expires_cookie() {
        let manager = manager();
        let mut started = HeaderMap::new();
        let session = manager.session_start(&HeaderMap::new(), &mut started).await.unwrap();

        let mut response = HeaderMap::new();
        manager.session_destroy(&replay(&started), &mut response).await.unwrap();

        assert!(!manager.provider().contains(session.id()).await);
        let cleared = response.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cleared.starts_with("sid=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_destroy_unknown_session_still_succeeds() {
        let manager = manager();
        let mut request = HeaderMap::new();
        request.insert(COOKIE, HeaderValue::from_static("sid=never-issued"));
        let mut response = HeaderMap::new();

        manager.session_destroy(&request, &mut response).await.unwrap();
        assert!(response.get(SET_COOKIE).is_some());
    }

    #[tokio::test]
    async fn test_destroy_by_id_of_fresh_session() {
        let manager = manager();
        let mut started = HeaderMap::new();
        let session = manager.session_start(&HeaderMap::new(), &mut started).await.unwrap();

        let mut response = HeaderMap::new();
        manager.session_destroy_id(session.id(), &mut response).await.unwrap();

        assert!(manager.provider().is_empty().await);
        let cleared: Vec<_> = response.get_all(SET_COOKIE).iter().collect();
        assert_eq!(cleared.len(), 1);
        assert!(cleared[0].to_str().unwrap().starts_with("sid=;"));
    }

    #[tokio::test]
    async fn test_destroy_without_cookie_is_noop() {
        let manager = manager();
        let mut response = HeaderMap::new();

        manager.session_destroy(&HeaderMap::new(), &mut response).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_loop_reschedules() {
        let provider = MemoryProvider::new();
        let manager = Arc::new(
            Manager::with_provider(provider.clone(), ManagerConfig::default().with_max_lifetime_secs(10))
                .unwrap(),
        );
        provider.init("a").await.unwrap();

        let handle = manager.spawn_gc();

        // First sweep at t=0 keeps "a"; next sweep at t=10 keeps it too
        // (deadline not passed); the one at t=20 removes it.
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert!(provider.contains("a").await);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!provider.contains("a").await);

        handle.abort();
    }
}
