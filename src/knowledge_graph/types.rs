//! Knowledge Graph Search API types
//!
//! Wire types mirror the JSON-LD shape returned by `entities:search`. Every
//! entity field is optional on the wire, so `EntityRecord` models each one as
//! `Option` rather than relying on lookups that may fail.

use serde::{Deserialize, Deserializer, Serialize};

/// Provider hard ceiling for `limit`
pub const MAX_SEARCH_LIMIT: usize = 500;

/// Sentinel for absent entity fields in caller-facing output
pub const NOT_AVAILABLE: &str = "Not available";

/// `kg_id` reported when nothing matched
pub const KG_ID_NOT_FOUND: &str = "Not found";

// =============================================================================
// Request
// =============================================================================

/// One search attempt against the remote endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    /// schema.org type filters, in priority order (empty = no filter)
    pub types: Vec<String>,
    pub limit: usize,
    /// ISO language codes (empty = provider default)
    pub languages: Vec<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            types: Vec::new(),
            limit: 10,
            languages: Vec::new(),
        }
    }

    pub fn with_types<S: AsRef<str>>(mut self, types: &[S]) -> Self {
        self.types = types.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_languages<S: AsRef<str>>(mut self, languages: &[S]) -> Self {
        self.languages = languages.iter().map(|l| l.as_ref().to_string()).collect();
        self
    }

    /// Limit actually sent to the provider
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_SEARCH_LIMIT)
    }
}

// =============================================================================
// Response (wire)
// =============================================================================

/// Top-level `entities:search` response
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(rename = "itemListElement", default)]
    pub item_list_element: Vec<RawCandidate>,
}

impl SearchResponse {
    pub fn total_results(&self) -> usize {
        self.item_list_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_list_element.is_empty()
    }
}

/// A ranked search hit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawCandidate {
    /// Provider relevance, roughly 0-1000
    #[serde(rename = "resultScore", default)]
    pub result_score: f64,
    #[serde(default)]
    pub result: EntityRecord,
}

/// Entity payload of a search hit
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EntityRecord {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "@type", default, deserialize_with = "one_or_many")]
    pub types: Vec<String>,
    pub url: Option<String>,
    pub image: Option<ImageObject>,
    #[serde(rename = "detailedDescription")]
    pub detailed_description: Option<DetailedDescription>,
}

impl EntityRecord {
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t == type_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ImageObject {
    #[serde(rename = "contentUrl")]
    pub content_url: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DetailedDescription {
    #[serde(rename = "articleBody")]
    pub article_body: Option<String>,
    pub url: Option<String>,
    pub license: Option<String>,
}

/// `@type` is an array in practice, but a bare string is valid JSON-LD.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(single)) => vec![single],
        Some(OneOrMany::Many(list)) => list,
        None => Vec::new(),
    })
}

// =============================================================================
// Caller-facing results
// =============================================================================

/// Stable caller-facing entity shape. Absent fields carry `NOT_AVAILABLE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntity {
    pub kg_id: String,
    pub name: String,
    pub description: String,
    pub types: Vec<String>,
    pub url: String,
    pub image_url: String,
    pub detailed_description: String,
    pub detailed_description_url: String,
}

/// A candidate with its composite score and components
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub entity: EntityRecord,
    pub score: f64,
    pub name_score: f64,
    pub normalized_result_score: f64,
    pub location_score: f64,
    pub type_score: f64,
    /// Raw provider score, before normalization
    pub result_score: f64,
}

/// Terminal result of a lookup.
///
/// `success=false` is reserved for configuration/transport failures that have
/// no fallback; "nothing matched" is `success=true` with `entity=None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub success: bool,
    pub entity: Option<CanonicalEntity>,
    pub message: String,
    pub kg_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResult {
    pub fn found(entity: CanonicalEntity, message: String) -> Self {
        Self {
            success: true,
            kg_id: entity.kg_id.clone(),
            entity: Some(entity),
            message,
            error: None,
        }
    }

    pub fn no_match(message: String) -> Self {
        Self {
            success: true,
            entity: None,
            message,
            kg_id: KG_ID_NOT_FOUND.to_string(),
            error: None,
        }
    }

    pub fn failure(error: &crate::error::KgError) -> Self {
        Self {
            success: false,
            entity: None,
            message: error.to_string(),
            kg_id: KG_ID_NOT_FOUND.to_string(),
            error: Some(error.code().to_string()),
        }
    }

    pub fn is_match(&self) -> bool {
        self.success && self.entity.is_some()
    }
}

/// One row of the diagnostic listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugCandidate {
    pub rank: usize,
    pub name: String,
    pub description: String,
    pub kg_id: String,
    pub types: Vec<String>,
    pub result_score: f64,
    pub url: String,
}

/// Every hit of a single search, unfiltered and unscored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugListing {
    pub success: bool,
    pub query: String,
    pub total_results: usize,
    pub entities: Vec<DebugCandidate>,
}
