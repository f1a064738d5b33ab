//! Session visit counter.

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::state::AppState;

/// Session key holding the visit count.
pub const COUNT_KEY: &str = "count";

/// Visit counter response.
#[derive(Debug, Serialize, Deserialize)]
pub struct VisitResponse {
    /// Id of the caller's session.
    pub session_id: String,
    /// Visits made with this session, including this one.
    pub count: u64,
}

/// Start (or resume) the caller's session and count the visit.
pub async fn visit_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let mut response = HeaderMap::new();
    let session = state.sessions.session_start(&headers, &mut response).await?;

    let count = session.get_as::<u64>(COUNT_KEY).await?.unwrap_or(0) + 1;
    session.set(COUNT_KEY, &count).await?;

    Ok((
        response,
        Json(VisitResponse {
            session_id: session.id().to_string(),
            count,
        }),
    ))
}

/// Create session routes.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/session", get(visit_handler))
}
