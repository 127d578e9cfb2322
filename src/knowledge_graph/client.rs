//! Knowledge Graph Search API client
//!
//! One `reqwest::Client` (and its connection pool) per `KnowledgeGraphClient`.
//! Every outcome is classified into `KgError`; nothing is retried here.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, warn};

use super::types::{CanonicalEntity, SearchQuery, SearchResponse};
use crate::config::KgConfig;
use crate::error::KgError;

/// Remote lookups the matcher depends on
#[async_trait]
pub trait KnowledgeGraphSource: Send + Sync {
    /// Free-text search.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, KgError>;

    /// Identifier-keyed lookup. Zero hits is `KgError::NotFound`.
    async fn lookup_by_id(&self, kg_id: &str) -> Result<CanonicalEntity, KgError>;
}

/// HTTP implementation of `KnowledgeGraphSource`
pub struct KnowledgeGraphClient {
    http: Client,
    config: KgConfig,
}

impl KnowledgeGraphClient {
    pub fn new(config: KgConfig) -> Result<Self, KgError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| KgError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self, KgError> {
        Self::new(KgConfig::from_env()?)
    }

    pub fn config(&self) -> &KgConfig {
        &self.config
    }

    /// GET the endpoint with the given parameters plus the credential
    async fn get(&self, mut params: Vec<(&'static str, String)>) -> Result<SearchResponse, KgError> {
        params.push(("indent", "true".to_string()));
        params.push(("key", self.config.api_key.clone()));

        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let err = KgError::from_status(status, &body);
            match &err {
                KgError::AccessDenied => {
                    error!("Knowledge Graph API access denied - check API key and permissions")
                }
                KgError::QuotaExceeded => error!("Knowledge Graph API quota exceeded"),
                _ => error!(status = status.as_u16(), "Knowledge Graph API error"),
            }
            return Err(err);
        }

        response.json::<SearchResponse>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                KgError::Parse(e.without_url().to_string())
            }
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> KgError {
        if err.is_timeout() {
            error!("Knowledge Graph API request timeout");
            KgError::Timeout {
                secs: self.config.timeout.as_secs(),
            }
        } else {
            // the request URL carries the API key
            let err = err.without_url();
            error!(error = %err, "Knowledge Graph API request failed");
            KgError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl KnowledgeGraphSource for KnowledgeGraphClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, KgError> {
        debug!(query = %query.text, types = ?query.types, "Searching Knowledge Graph");

        let mut params = vec![
            ("query", query.text.clone()),
            ("limit", query.effective_limit().to_string()),
        ];
        params.extend(query.types.iter().map(|t| ("types", t.clone())));
        params.extend(query.languages.iter().map(|l| ("languages", l.clone())));

        let response = self.get(params).await?;
        debug!(found = response.total_results(), "Knowledge Graph search complete");
        Ok(response)
    }

    async fn lookup_by_id(&self, kg_id: &str) -> Result<CanonicalEntity, KgError> {
        debug!(kg_id, "Fetching entity by ID");

        let response = self.get(vec![("ids", kg_id.to_string())]).await?;
        match response.item_list_element.first() {
            Some(candidate) => Ok(CanonicalEntity::from(&candidate.result)),
            None => {
                warn!(kg_id, "No entity found for KG ID");
                Err(KgError::NotFound(kg_id.to_string()))
            }
        }
    }
}
