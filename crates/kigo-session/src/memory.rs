//! Process-local session provider with LRU expiry tracking.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::session::Session;

/// In-memory session provider.
///
/// Sessions live in an unbounded [`LruCache`] keyed by session id, with the
/// most recently used session at the front. Every payload access promotes
/// the session, so the least recently used end always holds the stalest
/// session and [`collect_expired`](Provider::collect_expired) can stop at
/// the first session that is still fresh.
///
/// All structural operations take a single store lock. Sessions are lost
/// when the process exits.
pub struct MemoryProvider {
    sessions: Mutex<LruCache<String, Arc<Session>>>,
    this: Weak<MemoryProvider>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            sessions: Mutex::new(LruCache::unbounded()),
            this: this.clone(),
        })
    }

    /// Ids of live sessions, most recently used first.
    pub async fn ids_by_recency(&self) -> Vec<String> {
        self.sessions
            .lock()
            .await
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn create(&self, sessions: &mut LruCache<String, Arc<Session>>, id: &str) -> Arc<Session> {
        let owner: Weak<dyn Provider> = self.this.clone();
        let session = Arc::new(Session::new(id, owner));
        if sessions.push(id.to_string(), Arc::clone(&session)).is_some_and(|(old, _)| old == id) {
            debug!(session_id = %id, "Replaced existing session");
        }
        debug!(session_id = %id, live = sessions.len(), "Session created");
        session
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    async fn init(&self, id: &str) -> Result<Arc<Session>> {
        let mut sessions = self.sessions.lock().await;
        Ok(self.create(&mut sessions, id))
    }

    async fn read(&self, id: &str) -> Result<Arc<Session>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.peek(id) {
            trace!(session_id = %id, "Session found");
            return Ok(Arc::clone(session));
        }
        debug!(session_id = %id, "Unknown session id, creating");
        Ok(self.create(&mut sessions, id))
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        match sessions.pop(id) {
            Some(_) => {
                debug!(session_id = %id, live = sessions.len(), "Session destroyed");
                Ok(())
            }
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    async fn collect_expired(&self, max_lifetime: Duration) -> Result<usize> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let mut collected = 0;

        loop {
            let expired = matches!(
                sessions.peek_lru(),
                Some((_, session)) if session
                    .last_accessed()
                    .checked_add(max_lifetime)
                    .is_some_and(|deadline| deadline < now)
            );
            if !expired {
                break;
            }
            if let Some((id, _)) = sessions.pop_lru() {
                trace!(session_id = %id, "Collected expired session");
                collected += 1;
            }
        }

        if collected > 0 {
            debug!(count = collected, live = sessions.len(), "Collected expired sessions");
        }

        Ok(collected)
    }

    async fn update(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        match sessions.get(id) {
            Some(session) => {
                session.touch(Instant::now());
                Ok(())
            }
            None => Err(Error::NotFound(id.to_string())),
        }
    }

    async fn contains(&self, id: &str) -> bool {
        self.sessions.lock().await.contains(id)
    }

    async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
