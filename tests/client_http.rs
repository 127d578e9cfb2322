//! HTTP client tests against an in-process fixture server.
//!
//! Each route stands in for one provider behaviour; the client is pointed at
//! it through `KgConfig::with_endpoint`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use kg_lookup::{KgConfig, KgError, KnowledgeGraphClient, KnowledgeGraphSource, SearchQuery};

#[derive(Clone, Default)]
struct Recorded {
    last_query: Arc<Mutex<Option<String>>>,
}

impl Recorded {
    fn params(&self) -> Vec<(String, String)> {
        let raw = self.last_query.lock().unwrap().clone().unwrap_or_default();
        raw.split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (k.to_string(), v.replace('+', " ").replace("%22", "\""))
            })
            .collect()
    }

    fn values(&self, key: &str) -> Vec<String> {
        self.params()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }
}

async fn search_ok(State(recorded): State<Recorded>, RawQuery(query): RawQuery) -> impl IntoResponse {
    *recorded.last_query.lock().unwrap() = query;
    Json(json!({
        "@type": "ItemList",
        "itemListElement": [
            {
                "@type": "EntitySearchResult",
                "resultScore": 812.5,
                "result": {
                    "@id": "kg:/m/01fz8d",
                    "name": "Starbucks",
                    "@type": ["Corporation", "Organization", "Thing"],
                    "description": "Coffee company",
                    "image": { "contentUrl": "https://example.com/logo.png" },
                    "detailedDescription": {
                        "articleBody": "Starbucks Corporation is a coffeehouse chain.",
                        "url": "https://en.wikipedia.org/wiki/Starbucks"
                    }
                }
            },
            {
                "resultScore": 12,
                "result": { "name": "Starbucks Reserve", "@type": "Place" }
            }
        ]
    }))
}

async fn lookup(RawQuery(query): RawQuery) -> impl IntoResponse {
    let query = query.unwrap_or_default();
    if query.contains("ids=%2Fg%2Fmissing") || query.contains("ids=/g/missing") {
        return Json(json!({ "itemListElement": [] }));
    }
    Json(json!({
        "itemListElement": [
            { "resultScore": 0, "result": { "@id": "kg:/g/11bzt6slj6", "name": "Kenny Bunch Plumbing" } }
        ]
    }))
}

async fn forbidden() -> impl IntoResponse {
    (StatusCode::FORBIDDEN, "API key not valid")
}

async fn quota() -> impl IntoResponse {
    (StatusCode::TOO_MANY_REQUESTS, "Quota exceeded")
}

async fn server_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "x".repeat(500))
}

async fn garbage() -> impl IntoResponse {
    (StatusCode::OK, "<html>not json</html>")
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "itemListElement": [] }))
}

async fn spawn_fixture() -> (SocketAddr, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/search", get(search_ok))
        .route("/lookup", get(lookup))
        .route("/forbidden", get(forbidden))
        .route("/quota", get(quota))
        .route("/error", get(server_error))
        .route("/garbage", get(garbage))
        .route("/slow", get(slow))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, recorded)
}

fn client_for(addr: SocketAddr, path: &str) -> KnowledgeGraphClient {
    let config = KgConfig::new("test-key")
        .unwrap()
        .with_endpoint(format!("http://{}{}", addr, path));
    KnowledgeGraphClient::new(config).unwrap()
}

// =============================================================================
// Success paths
// =============================================================================

#[tokio::test]
async fn search_parses_provider_response() {
    let (addr, _) = spawn_fixture().await;
    let client = client_for(addr, "/search");

    let response = client.search(&SearchQuery::new("Starbucks")).await.unwrap();

    assert_eq!(response.total_results(), 2);
    let first = &response.item_list_element[0];
    assert_eq!(first.result_score, 812.5);
    assert_eq!(first.result.id.as_deref(), Some("kg:/m/01fz8d"));
    assert!(first.result.has_type("Corporation"));
    // a single string @type is accepted too
    assert_eq!(response.item_list_element[1].result.types, vec!["Place"]);
}

#[tokio::test]
async fn search_sends_expected_parameters() {
    let (addr, recorded) = spawn_fixture().await;
    let client = client_for(addr, "/search");

    let query = SearchQuery::new("\"Acme\" Dallas")
        .with_types(&["Organization", "Corporation"])
        .with_languages(&["en"])
        .with_limit(9000);
    client.search(&query).await.unwrap();

    assert_eq!(recorded.values("query"), vec!["\"Acme\" Dallas"]);
    assert_eq!(recorded.values("limit"), vec!["500"]);
    assert_eq!(recorded.values("types"), vec!["Organization", "Corporation"]);
    assert_eq!(recorded.values("languages"), vec!["en"]);
    assert_eq!(recorded.values("indent"), vec!["true"]);
    assert_eq!(recorded.values("key"), vec!["test-key"]);
}

#[tokio::test]
async fn search_without_types_sends_no_filter() {
    let (addr, recorded) = spawn_fixture().await;
    let client = client_for(addr, "/search");

    client.search(&SearchQuery::new("Acme")).await.unwrap();

    assert!(recorded.values("types").is_empty());
    assert_eq!(recorded.values("limit"), vec!["10"]);
}

#[tokio::test]
async fn lookup_by_id_returns_canonical_entity() {
    let (addr, _) = spawn_fixture().await;
    let client = client_for(addr, "/lookup");

    let entity = client.lookup_by_id("/g/11bzt6slj6").await.unwrap();

    assert_eq!(entity.kg_id, "kg:/g/11bzt6slj6");
    assert_eq!(entity.name, "Kenny Bunch Plumbing");
    assert_eq!(entity.description, "Not available");
    assert_eq!(entity.image_url, "Not available");
}

#[tokio::test]
async fn lookup_by_id_with_no_hits_is_not_found() {
    let (addr, _) = spawn_fixture().await;
    let client = client_for(addr, "/lookup");

    let err = client.lookup_by_id("/g/missing").await.unwrap_err();

    assert_eq!(err, KgError::NotFound("/g/missing".to_string()));
    assert_eq!(err.code(), "NOT_FOUND");
}

// =============================================================================
// Failure classification
// =============================================================================

#[tokio::test]
async fn forbidden_is_access_denied() {
    let (addr, _) = spawn_fixture().await;
    let err = client_for(addr, "/forbidden")
        .search(&SearchQuery::new("Acme"))
        .await
        .unwrap_err();

    assert_eq!(err, KgError::AccessDenied);
    assert_eq!(err.code(), "API_ACCESS_DENIED");
}

#[tokio::test]
async fn too_many_requests_is_quota_exceeded() {
    let (addr, _) = spawn_fixture().await;
    let err = client_for(addr, "/quota")
        .search(&SearchQuery::new("Acme"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "QUOTA_EXCEEDED");
}

#[tokio::test]
async fn other_status_carries_truncated_body() {
    let (addr, _) = spawn_fixture().await;
    let err = client_for(addr, "/error")
        .search(&SearchQuery::new("Acme"))
        .await
        .unwrap_err();

    match err {
        KgError::Api { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn undecodable_body_is_parse_error() {
    let (addr, _) = spawn_fixture().await;
    let err = client_for(addr, "/garbage")
        .search(&SearchQuery::new("Acme"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PARSE_ERROR");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let (addr, _) = spawn_fixture().await;
    let config = KgConfig::new("test-key")
        .unwrap()
        .with_endpoint(format!("http://{}/slow", addr))
        .with_timeout(Duration::from_millis(200));
    let client = KnowledgeGraphClient::new(config).unwrap();

    let err = client.search(&SearchQuery::new("Acme")).await.unwrap_err();

    assert!(matches!(err, KgError::Timeout { .. }), "got {:?}", err);
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn refused_connection_is_network_error_without_key() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(addr, "/search")
        .search(&SearchQuery::new("Acme"))
        .await
        .unwrap_err();

    match &err {
        KgError::Network(message) => assert!(!message.contains("test-key")),
        other => panic!("expected Network error, got {:?}", other),
    }
}
