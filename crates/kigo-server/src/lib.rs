//! HTTP server for Kigo.
//!
//! Request handlers reach the session subsystem through the
//! [`kigo_session::Manager`] held in [`AppState`].
//!
//! # Example
//!
//! ```ignore
//! use kigo_server::{AppState, Server};
//!
//! let manager = Arc::new(Manager::new(&registry, config.session.manager_config())?);
//! manager.spawn_gc();
//!
//! let server = Server::new(AppState::new(manager), config.server.bind_address()?);
//! server.run().await?;
//! ```

pub mod error;
pub mod routes;
pub mod state;

pub use error::{Result, ServerError};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Kigo HTTP server.
pub struct Server {
    /// Application state.
    state: AppState,
    /// Address to listen on.
    bind_address: SocketAddr,
}

impl Server {
    /// Create a server from application state and a listen address.
    pub fn new(state: AppState, bind_address: SocketAddr) -> Self {
        Self {
            state,
            bind_address,
        }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .merge(routes::session_routes())
            .merge(routes::auth_routes())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server.
    pub async fn run(self) -> Result<()> {
        let addr = self.bind_address;
        let router = self.router();

        info!("Starting server on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }
}
