//! Session handover and logout
//!
//! Token verification belongs to the external OAuth collaborator; this only
//! turns an already-verified token into a server-side session.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::session::{clear_cookie_value, session_cookie, set_cookie_value};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub access_token: String,
    /// Account identifier reported by the identity provider
    #[serde(default)]
    pub subject: Option<String>,
}

/// POST /auth/session
pub async fn create_session(
    State(state): State<AppState>,
    body: Result<Json<SessionRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "JSON payload required" })),
        )
            .into_response();
    };
    if request.access_token.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "access_token is required" })),
        )
            .into_response();
    }

    let id = state.sessions.create(request.subject).await;
    tracing::info!(session = %id, "Session created");

    (
        [(header::SET_COOKIE, set_cookie_value(id))],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// POST /auth/logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(id) = session_cookie(&headers) {
        if let Some(session) = state.sessions.remove(id).await {
            state.usage.forget(id).await;
            tracing::info!(
                session = %id,
                subject = ?session.subject,
                started = %session.created_at,
                "Session ended"
            );
        }
    }

    (
        [(header::SET_COOKIE, clear_cookie_value())],
        Json(json!({ "success": true })),
    )
        .into_response()
}
