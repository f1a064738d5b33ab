//! Application state shared across handlers.

use std::sync::Arc;

use kigo_session::Manager;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session manager.
    pub sessions: Arc<Manager>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(sessions: Arc<Manager>) -> Self {
        Self { sessions }
    }
}
