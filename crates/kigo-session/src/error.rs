//! Error types for session operations.

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A provider was registered twice under the same backend name.
    #[error("Session provider registered twice: {0}")]
    DuplicateProvider(String),

    /// No provider is registered under the requested backend name.
    #[error("Unknown session provider: {0} (not registered)")]
    UnknownProvider(String),

    /// Manager configuration is unusable.
    #[error("Invalid session configuration: {0}")]
    Config(String),

    /// Session was not found in the store.
    #[error("Session not found: {0}")]
    NotFound(String),

    /// The provider owning a session has been dropped.
    #[error("Session provider is no longer available")]
    ProviderUnavailable,

    /// The session cookie could not be decoded or encoded.
    #[error("Malformed session cookie: {0}")]
    MalformedCookie(String),

    /// A session value could not be converted to or from JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from a storage backend.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Whether this error only reports a missing session.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
