//! Entity matching orchestrator
//!
//! Drives a fixed sequence of (query variant × type filter) searches and keeps
//! the best-scoring business candidate seen so far.
//!
//! ```text
//! known KG ID? ──yes──► lookup_by_id ──found──► done
//!      │                      │
//!      no                 not found / error
//!      ▼                      ▼
//! for query in ["name" location, "name", name, "clean" location]
//!   for types in [LocalBusiness], [Organization, Corporation], [Place],
//!                [LocalBusiness, Organization, Place], <none>
//!     search → drop Person → score → keep if better
//!     score > short-circuit threshold ──► stop
//! best ≥ acceptance floor ? match : no match
//! ```
//!
//! Calls are strictly sequential; each attempt is one outbound request.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::client::KnowledgeGraphSource;
use super::normalize::normalize_name;
use super::scorer::MatchScorer;
use super::types::{
    CanonicalEntity, DebugCandidate, DebugListing, MatchResult, RawCandidate, ScoredCandidate,
    SearchQuery, NOT_AVAILABLE,
};
use crate::config::MatchPolicy;
use crate::error::KgError;

/// Type filters tried for every query variant, most specific first.
/// The empty filter means "no type restriction".
pub const TYPE_FILTER_VARIANTS: [&[&str]; 5] = [
    &["LocalBusiness"],
    &["Organization", "Corporation"],
    &["Place"],
    &["LocalBusiness", "Organization", "Place"],
    &[],
];

/// Type filter for the single-search paths
pub const SINGLE_PASS_TYPES: [&str; 3] = ["LocalBusiness", "Organization", "Place"];

const SINGLE_PASS_LIMIT: usize = 10;
const DEBUG_LISTING_LIMIT: usize = 20;

/// Entities of this type are never business matches
const EXCLUDED_TYPE: &str = "Person";

/// Query texts in priority order
pub fn query_variants(name: &str, location: Option<&str>) -> Vec<String> {
    let mut queries = Vec::with_capacity(4);

    if let Some(location) = location {
        queries.push(format!("\"{}\" {}", name, location));
    }
    queries.push(format!("\"{}\"", name));
    queries.push(name.to_string());

    let clean = normalize_name(name);
    if clean != name {
        if let Some(location) = location {
            queries.push(format!("\"{}\" {}", clean, location));
        }
    }

    queries
}

/// Resolves business names to Knowledge Graph entities
#[derive(Clone)]
pub struct EntityMatcher {
    source: Arc<dyn KnowledgeGraphSource>,
    policy: MatchPolicy,
}

impl EntityMatcher {
    pub fn new(source: Arc<dyn KnowledgeGraphSource>, policy: MatchPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Multi-strategy lookup.
    ///
    /// Per-attempt transport failures are skipped; if every attempt fails the
    /// result is still `success=true` with no entity. Only a non-recoverable
    /// (configuration) error yields `success=false`.
    #[instrument(skip(self))]
    pub async fn find_business(
        &self,
        name: &str,
        location: Option<&str>,
        known_id: Option<&str>,
    ) -> MatchResult {
        let location = non_blank(location);

        if let Some(kg_id) = non_blank(known_id) {
            match self.source.lookup_by_id(kg_id).await {
                Ok(entity) => {
                    info!(kg_id, name = %entity.name, "Resolved entity by KG ID");
                    return found_by_id(entity, kg_id);
                }
                Err(e) if !e.is_recoverable() => return MatchResult::failure(&e),
                Err(e) => {
                    debug!(kg_id, code = e.code(), "Direct lookup failed, falling back to search")
                }
            }
        }

        let scorer = MatchScorer::new(name, location);
        let mut best: Option<ScoredCandidate> = None;
        let mut attempts = 0usize;

        'variants: for text in query_variants(name, location) {
            for types in TYPE_FILTER_VARIANTS {
                attempts += 1;
                let query = SearchQuery::new(text.as_str())
                    .with_types(types)
                    .with_limit(self.policy.search_limit);

                let candidate = match self.best_for(&query, &scorer).await {
                    Ok(Some(candidate)) => candidate,
                    Ok(None) => continue,
                    Err(e) => return MatchResult::failure(&e),
                };

                let best_score = best.as_ref().map_or(0.0, |b| b.score);
                if candidate.score > best_score {
                    let confident = self.policy.is_confident(candidate.score);
                    best = Some(candidate);
                    if confident {
                        debug!(attempts, "High-confidence match, stopping search");
                        break 'variants;
                    }
                }
            }
        }

        match best {
            Some(best) if self.policy.accepts(best.score) => {
                let entity = CanonicalEntity::from(&best.entity);
                info!(name, matched = %entity.name, score = best.score, attempts, "Business entity matched");
                let message = format!("Found entity: {} (score: {:.2})", entity.name, best.score);
                MatchResult::found(entity, message)
            }
            best => {
                info!(
                    name,
                    best_score = best.map(|b| b.score),
                    attempts,
                    "No business entity above acceptance floor"
                );
                MatchResult::no_match(format!(
                    "No business entity found for \"{}\" - may be a local business without Knowledge Graph presence",
                    name
                ))
            }
        }
    }

    /// Single search of `name location` under the business type filter.
    ///
    /// Same scorer and acceptance floor as `find_business`, but with no
    /// fallback a transport failure is reported as `success=false`.
    #[instrument(skip(self))]
    pub async fn quick_match(&self, name: &str, location: Option<&str>) -> MatchResult {
        let location = non_blank(location);
        let query = SearchQuery::new(combined_query(name, location))
            .with_types(&SINGLE_PASS_TYPES)
            .with_limit(SINGLE_PASS_LIMIT);

        let response = match self.source.search(&query).await {
            Ok(response) => response,
            Err(e) => {
                warn!(code = e.code(), "Single-pass search failed");
                return MatchResult::failure(&e);
            }
        };
        if response.is_empty() {
            return MatchResult::no_match("No entities found in Knowledge Graph".to_string());
        }

        let survivors = without_people(response.item_list_element);
        match MatchScorer::new(name, location).best_match(&survivors) {
            Some(best) if self.policy.accepts(best.score) => {
                let entity = CanonicalEntity::from(&best.entity);
                let message = format!("Found entity: {} (score: {:.2})", entity.name, best.score);
                MatchResult::found(entity, message)
            }
            _ => MatchResult::no_match("No good matches found".to_string()),
        }
    }

    /// Every hit for `name location`, ranked as returned, for troubleshooting.
    pub async fn debug_search(
        &self,
        name: &str,
        location: Option<&str>,
    ) -> Result<DebugListing, KgError> {
        let text = combined_query(name, non_blank(location));
        let query = SearchQuery::new(text.as_str())
            .with_types(&SINGLE_PASS_TYPES)
            .with_limit(DEBUG_LISTING_LIMIT);

        let response = self.source.search(&query).await?;
        let entities: Vec<DebugCandidate> = response
            .item_list_element
            .iter()
            .enumerate()
            .map(|(i, candidate)| DebugCandidate::from_candidate(i + 1, candidate))
            .collect();

        Ok(DebugListing {
            success: true,
            query: text,
            total_results: entities.len(),
            entities,
        })
    }

    /// Best candidate of one attempt. Recoverable failures count as "no results".
    async fn best_for(
        &self,
        query: &SearchQuery,
        scorer: &MatchScorer,
    ) -> Result<Option<ScoredCandidate>, KgError> {
        let response = match self.source.search(query).await {
            Ok(response) => response,
            Err(e) if e.is_recoverable() => {
                debug!(query = %query.text, code = e.code(), "Search attempt failed, trying next variant");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let survivors = without_people(response.item_list_element);
        if survivors.is_empty() {
            return Ok(None);
        }
        Ok(scorer.best_match(&survivors))
    }
}

fn without_people(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    candidates
        .into_iter()
        .filter(|c| !c.result.has_type(EXCLUDED_TYPE))
        .collect()
}

fn found_by_id(entity: CanonicalEntity, requested_id: &str) -> MatchResult {
    let message = format!("Found entity by ID: {}", entity.name);
    let mut result = MatchResult::found(entity, message);
    if result.kg_id == NOT_AVAILABLE {
        result.kg_id = requested_id.to_string();
    }
    result
}

fn combined_query(name: &str, location: Option<&str>) -> String {
    match location {
        Some(location) => format!("{} {}", name, location),
        None => name.to_string(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
