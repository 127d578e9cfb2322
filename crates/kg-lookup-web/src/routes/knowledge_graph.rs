//! Knowledge Graph lookup endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use kg_lookup::{ApiKind, DebugListing, MatchResult};

use crate::session::SessionId;
use crate::state::AppState;

const TEST_BUSINESS: &str = "Starbucks";
const TEST_LOCATION: &str = "Seattle";

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LookupRequest {
    pub business_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Accepted and echoed; not used for matching
    #[serde(default)]
    pub place_id: Option<String>,
    /// Known KG ID, tried before any text search
    #[serde(default)]
    pub kgmid_from_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestData {
    pub business_name: String,
    pub location: String,
    pub place_id: String,
    pub kgmid_from_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    #[serde(flatten)]
    pub result: MatchResult,
    pub request_data: RequestData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestRequest {
    pub business_name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestResponse {
    pub test_status: &'static str,
    pub api_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_result: Option<MatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_results: Option<DebugListing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TestResponse {
    fn completed(result: MatchResult) -> Self {
        Self {
            test_status: "completed",
            api_configured: true,
            test_result: Some(result),
            debug_results: None,
            error: None,
            message: None,
        }
    }

    fn failed(api_configured: bool, error: String, message: String) -> Self {
        Self {
            test_status: "failed",
            api_configured,
            test_result: None,
            debug_results: None,
            error: Some(error),
            message: Some(message),
        }
    }

    fn not_configured() -> Self {
        Self::failed(
            false,
            "No API key found".to_string(),
            "GOOGLE_MAPS_API_KEY not set in environment".to_string(),
        )
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/knowledge-graph
pub async fn lookup(
    State(state): State<AppState>,
    Extension(SessionId(session)): Extension<SessionId>,
    body: Result<Json<LookupRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected lookup body");
            return bad_request("JSON payload required");
        }
    };

    let business_name = match request.business_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return bad_request("business_name is required"),
    };

    let Some(matcher) = state.matcher.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "success": false,
                "error": "API_CONFIG_ERROR",
                "message": "Google Maps API key not configured",
            })),
        )
            .into_response();
    };

    let result = matcher
        .find_business(
            &business_name,
            request.location.as_deref(),
            request.kgmid_from_url.as_deref(),
        )
        .await;

    if result.is_match() {
        state.usage.record(session, ApiKind::Kg, 1).await;
    }
    if state.debug_mode {
        tracing::debug!(
            business_name = %business_name,
            success = result.success,
            kgmid = ?request.kgmid_from_url,
            "Knowledge Graph lookup"
        );
    }

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let response = LookupResponse {
        result,
        request_data: RequestData {
            business_name,
            location: request.location.unwrap_or_default(),
            place_id: request.place_id.unwrap_or_default(),
            kgmid_from_url: request.kgmid_from_url,
        },
    };
    (status, Json(response)).into_response()
}

/// GET /api/test-kg
pub async fn test_default(State(state): State<AppState>) -> Json<TestResponse> {
    let Some(matcher) = state.matcher.as_ref() else {
        return Json(TestResponse::not_configured());
    };
    let result = matcher
        .find_business(TEST_BUSINESS, Some(TEST_LOCATION), None)
        .await;
    Json(TestResponse::completed(result))
}

/// POST /api/test-kg
pub async fn test_custom(
    State(state): State<AppState>,
    body: Option<Json<TestRequest>>,
) -> Json<TestResponse> {
    let Some(matcher) = state.matcher.as_ref() else {
        return Json(TestResponse::not_configured());
    };
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let name = request.business_name.as_deref().unwrap_or(TEST_BUSINESS);
    let location = request.location.as_deref().unwrap_or(TEST_LOCATION);

    if !request.debug {
        let result = matcher.find_business(name, Some(location), None).await;
        return Json(TestResponse::completed(result));
    }

    match matcher.debug_search(name, Some(location)).await {
        Ok(listing) => Json(TestResponse {
            test_status: "debug_completed",
            api_configured: true,
            test_result: None,
            debug_results: Some(listing),
            error: None,
            message: None,
        }),
        Err(e) => {
            tracing::error!(code = e.code(), "Knowledge Graph debug search failed");
            Json(TestResponse::failed(true, e.code().to_string(), e.to_string()))
        }
    }
}

/// /api/test-kg when DEBUG is off
pub async fn test_unavailable() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not available" })),
    )
        .into_response()
}
