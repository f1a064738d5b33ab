//! Storage provider contract for sessions.
//!
//! A [`Provider`] owns live sessions and decides where they are kept. The
//! [`Manager`](crate::Manager) talks only to this trait, so backends other
//! than the in-memory one (file system, database) can be registered without
//! touching request handling.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::session::Session;

/// Trait for session storage backends.
///
/// Implementations must be safe to call concurrently from any number of
/// request handlers and from the garbage-collection task.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Create and register a new, empty session under `id`.
    async fn init(&self, id: &str) -> Result<Arc<Session>>;

    /// Return the session for `id`.
    ///
    /// Providers in this crate create a fresh session when `id` is unknown,
    /// so callers never have to handle a first-contact miss themselves.
    async fn read(&self, id: &str) -> Result<Arc<Session>>;

    /// Remove the session for `id`.
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) when no such
    /// session exists; any other error is a storage failure.
    async fn destroy(&self, id: &str) -> Result<()>;

    /// Remove every session not accessed within `max_lifetime`.
    ///
    /// Returns the number of sessions removed.
    async fn collect_expired(&self, max_lifetime: Duration) -> Result<usize>;

    /// Refresh the access time and recency of `id`.
    ///
    /// Called by [`Session`] after every payload read or write.
    async fn update(&self, id: &str) -> Result<()>;

    /// Check whether a live session exists for `id` without refreshing it.
    async fn contains(&self, id: &str) -> bool;

    /// Number of live sessions.
    async fn len(&self) -> usize;

    /// Check if there are no live sessions.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
