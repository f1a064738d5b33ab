//! Cookie-bound server-side sessions with pluggable storage providers.
//!
//! This crate provides the session layer for Kigo:
//! - [`Session`]: per-browser key/value state with access tracking
//! - [`Provider`]: storage backend contract, with [`MemoryProvider`] as the
//!   built-in LRU-ordered in-memory backend
//! - [`ProviderRegistry`]: named providers assembled at startup
//! - [`Manager`]: cookie handling, session start/destroy, and periodic
//!   garbage collection
//!
//! # Example
//!
//! ```rust,ignore
//! use kigo_session::{Manager, ManagerConfig, ProviderRegistry};
//!
//! let registry = ProviderRegistry::with_defaults();
//! let manager = Arc::new(Manager::new(
//!     &registry,
//!     ManagerConfig::new("memory").with_max_lifetime_secs(3600),
//! )?);
//! manager.spawn_gc();
//!
//! let session = manager.session_start(request.headers(), response.headers_mut()).await?;
//! session.set("user_id", &user.id).await?;
//! ```

mod config;
pub mod cookies;
mod error;
mod id;
mod manager;
mod memory;
mod provider;
mod registry;
mod session;

pub use config::{DEFAULT_COOKIE_NAME, DEFAULT_MAX_LIFETIME, ManagerConfig};
pub use error::{Error, Result};
pub use id::{SESSION_ID_BYTES, generate_session_id};
pub use manager::Manager;
pub use memory::MemoryProvider;
pub use provider::Provider;
pub use registry::{MEMORY_PROVIDER, ProviderRegistry};
pub use session::Session;
