//! HTTP routes.

pub mod auth;
pub mod health;
pub mod session;

pub use auth::{CallbackParams, CallbackResponse, LoginResponse, auth_routes};
pub use health::{HealthResponse, health_routes};
pub use session::{VisitResponse, session_routes};
