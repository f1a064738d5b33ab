//! Login state and logout endpoints.
//!
//! Login stores the session id under [`STATE_KEY`] and hands it to the
//! caller as the `state` parameter for an external identity provider; the
//! callback checks that the returned state matches the session. Token
//! exchange with the provider happens elsewhere.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::state::AppState;

/// Session key holding the login state.
pub const STATE_KEY: &str = "state";

/// Login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// State to round-trip through the identity provider.
    pub state: String,
}

/// Callback query parameters.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// State returned by the identity provider.
    pub state: String,
}

/// Callback response.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallbackResponse {
    /// Whether the returned state matched the session.
    pub verified: bool,
}

/// Begin login: bind a state value to the caller's session.
pub async fn login_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let mut response = HeaderMap::new();
    let session = state.sessions.session_start(&headers, &mut response).await?;

    let login_state = session.id().to_string();
    session.set(STATE_KEY, &login_state).await?;
    debug!(session_id = %session.id(), "Login state issued");

    Ok((response, Json(LoginResponse { state: login_state })))
}

/// Finish login: verify the returned state against the session.
///
/// A mismatch destroys the session and is rejected with 403. The response
/// then carries only the removal cookie, even when the session was created
/// by this very request.
pub async fn callback_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse> {
    let mut response = HeaderMap::new();
    let session = state.sessions.session_start(&headers, &mut response).await?;

    let expected = session.get_as::<String>(STATE_KEY).await?;
    if expected.as_deref() != Some(params.state.as_str()) {
        warn!(session_id = %session.id(), "Invalid login state");
        let mut cleared = HeaderMap::new();
        state
            .sessions
            .session_destroy_id(session.id(), &mut cleared)
            .await?;
        return Ok((
            StatusCode::FORBIDDEN,
            cleared,
            Json(CallbackResponse { verified: false }),
        ));
    }

    session.delete(STATE_KEY).await?;
    Ok((
        StatusCode::OK,
        response,
        Json(CallbackResponse { verified: true }),
    ))
}

/// Log out: destroy the caller's session and expire the cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let mut response = HeaderMap::new();
    state.sessions.session_destroy(&headers, &mut response).await?;
    Ok((StatusCode::NO_CONTENT, response))
}

/// Create auth routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_handler))
        .route("/auth/callback", get(callback_handler))
        .route("/auth/logout", post(logout_handler))
}
