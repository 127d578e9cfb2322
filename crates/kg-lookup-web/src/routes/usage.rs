//! Status and usage accounting endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use kg_lookup::usage::estimated_cost;
use kg_lookup::ApiKind;

use crate::session::SessionId;
use crate::state::AppState;

const USAGE_LIMIT: &str = "$200 monthly credit";
const PRICE_PER_THOUSAND: &str = "$5 per 1000 calls";
const FREE_TIER: &str = "First 5000 calls free monthly";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub places_enabled: bool,
    pub kg_enabled: bool,
    pub usage_today: u64,
    pub usage_limit: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CallCost {
    pub calls_today: u64,
    pub estimated_cost: f64,
}

impl CallCost {
    fn new(calls: u64) -> Self {
        Self {
            calls_today: calls,
            estimated_cost: estimated_cost(calls),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsageBreakdown {
    pub places_api: CallCost,
    pub knowledge_graph: CallCost,
    pub total: CallCost,
}

#[derive(Debug, Serialize)]
pub struct Pricing {
    pub places_api: &'static str,
    pub knowledge_graph: &'static str,
    pub free_tier: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UsageStatsResponse {
    pub success: bool,
    pub usage_stats: UsageBreakdown,
    pub pricing: Pricing,
    /// RFC 3339 timestamp, or "Unknown" before the first recorded call
    pub session_start: String,
}

#[derive(Debug, Deserialize)]
pub struct IncrementRequest {
    #[serde(default)]
    pub api_type: Option<String>,
    #[serde(default = "default_count")]
    pub count: u64,
}

fn default_count() -> u64 {
    1
}

#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub success: bool,
    pub usage_today: u64,
    pub places_calls: u64,
    pub kg_calls: u64,
}

/// GET /api/status
pub async fn status(
    State(state): State<AppState>,
    Extension(SessionId(session)): Extension<SessionId>,
) -> Json<StatusResponse> {
    let usage = state.usage.snapshot(session).await;
    Json(StatusResponse {
        success: true,
        places_enabled: state.places_enabled,
        kg_enabled: state.matcher.is_some(),
        usage_today: usage.api_usage_today,
        usage_limit: USAGE_LIMIT,
        status: "online",
    })
}

/// GET /api/usage-stats
pub async fn usage_stats(
    State(state): State<AppState>,
    Extension(SessionId(session)): Extension<SessionId>,
) -> Json<UsageStatsResponse> {
    let usage = state.usage.snapshot(session).await;
    Json(UsageStatsResponse {
        success: true,
        usage_stats: UsageBreakdown {
            places_api: CallCost::new(usage.places_api_calls),
            knowledge_graph: CallCost::new(usage.kg_api_calls),
            total: CallCost::new(usage.typed_total()),
        },
        pricing: Pricing {
            places_api: PRICE_PER_THOUSAND,
            knowledge_graph: PRICE_PER_THOUSAND,
            free_tier: FREE_TIER,
        },
        session_start: usage
            .session_start
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "Unknown".to_string()),
    })
}

/// POST /api/increment-usage
pub async fn increment_usage(
    State(state): State<AppState>,
    Extension(SessionId(session)): Extension<SessionId>,
    body: Result<Json<IncrementRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": rejection.body_text() })),
            )
                .into_response();
        }
    };

    let kind = ApiKind::parse(request.api_type.as_deref().unwrap_or("unknown"));
    let usage = state.usage.record(session, kind, request.count).await;

    Json(IncrementResponse {
        success: true,
        usage_today: usage.api_usage_today,
        places_calls: usage.places_api_calls,
        kg_calls: usage.kg_api_calls,
    })
    .into_response()
}
