//! Cookie sessions
//!
//! The OAuth exchange happens outside this server. Once a caller holds a
//! verified access token it trades it for a `kg_session` cookie via
//! `POST /auth/session`; `require_session` guards every `/api/*` route.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "kg_session";

/// Session id of an authenticated request, inserted by `require_session`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

#[derive(Debug, Clone)]
pub struct Session {
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, subject: Option<String>) -> Uuid {
        let id = Uuid::new_v4();
        let session = Session {
            subject,
            created_at: Utc::now(),
        };
        self.sessions.write().await.insert(id, session);
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<Session> {
        self.sessions.write().await.remove(&id)
    }
}

/// Session id from the `kg_session` cookie, if present and well-formed
pub fn session_cookie(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn set_cookie_value(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn clear_cookie_value() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Middleware: 401 unless the request carries a live session cookie
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let live = match session_cookie(request.headers()) {
        Some(id) => state.sessions.get(id).await.map(|_| id),
        None => None,
    };

    match live {
        Some(id) => {
            request.extensions_mut().insert(SessionId(id));
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "Rejected unauthenticated request");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response()
        }
    }
}
