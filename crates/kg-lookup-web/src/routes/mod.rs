//! HTTP routes
//!
//! `/auth/*` is public. Everything under `/api/*` sits behind
//! `require_session`, except `/api/test-kg` when debug mode is off, which
//! answers 404 before any session check.

pub mod auth;
pub mod knowledge_graph;
pub mod usage;

use axum::{
    middleware as axum_mw,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::session::require_session;
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let mut protected = Router::new()
        .route("/api/knowledge-graph", post(knowledge_graph::lookup))
        .route("/api/status", get(usage::status))
        .route("/api/usage-stats", get(usage::usage_stats))
        .route("/api/increment-usage", post(usage::increment_usage));

    let mut public = Router::new()
        .route("/auth/session", post(auth::create_session))
        .route("/auth/logout", post(auth::logout));

    if state.debug_mode {
        protected = protected.route(
            "/api/test-kg",
            get(knowledge_graph::test_default).post(knowledge_graph::test_custom),
        );
    } else {
        public = public.route(
            "/api/test-kg",
            get(knowledge_graph::test_unavailable).post(knowledge_graph::test_unavailable),
        );
    }

    let protected =
        protected.layer(axum_mw::from_fn_with_state(state.clone(), require_session));

    public
        .merge(protected)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
