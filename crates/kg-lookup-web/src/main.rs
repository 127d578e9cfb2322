//! Knowledge Graph Lookup Web Server
//!
//! JSON API in front of the entity matcher, with cookie sessions and per-session
//! usage accounting.

mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kg_lookup::config::places_key_present;
use kg_lookup::{EntityMatcher, KnowledgeGraphClient, MatchPolicy};

use crate::state::AppState;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let debug_mode = std::env::var("DEBUG").is_ok_and(|v| v.eq_ignore_ascii_case("true"));

    // Initialize logging
    let default_filter = if debug_mode {
        "kg_lookup=debug,kg_lookup_web=debug,tower_http=debug"
    } else {
        "kg_lookup=info,kg_lookup_web=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Knowledge Graph lookup server");

    let matcher = match KnowledgeGraphClient::from_env() {
        Ok(client) => {
            let policy = MatchPolicy::from_env();
            tracing::info!(
                endpoint = %client.config().endpoint,
                acceptance_floor = policy.acceptance_floor,
                short_circuit_threshold = policy.short_circuit_threshold,
                "Knowledge Graph client ready"
            );
            Some(EntityMatcher::new(Arc::new(client), policy))
        }
        Err(e) => {
            tracing::warn!("Knowledge Graph client unavailable: {}", e);
            tracing::warn!("Lookups will answer 500 until GOOGLE_MAPS_API_KEY is set");
            None
        }
    };

    let state = AppState::new(matcher, places_key_present(), debug_mode);
    let app = routes::build_router(state);

    let bind = std::env::var("KG_LOOKUP_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid KG_LOOKUP_BIND address: {}", bind))?;

    tracing::info!("===========================================");
    tracing::info!("  Knowledge Graph lookup on http://{}", addr);
    tracing::info!("===========================================");
    tracing::info!("API Endpoints:");
    tracing::info!("  POST /auth/session            - Start session from verified token");
    tracing::info!("  POST /auth/logout             - End session");
    tracing::info!("  POST /api/knowledge-graph     - Business entity lookup");
    tracing::info!("  GET  /api/status              - API status");
    tracing::info!("  GET  /api/usage-stats         - Usage and estimated cost");
    tracing::info!("  POST /api/increment-usage     - Record external API calls");
    if debug_mode {
        tracing::info!("  GET|POST /api/test-kg         - Diagnostic lookup");
    }

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!("Address {} is already in use", addr);
            }
            return Err(e).with_context(|| format!("Failed to bind to {}", addr));
        }
    };

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
