//! Knowledge Graph Search API integration
//!
//! Client, name normalization, scoring, extraction and the matching
//! orchestrator built on top of them.

pub mod client;
mod extract;
pub mod matcher;
pub mod normalize;
pub mod scorer;
pub mod types;

pub use client::{KnowledgeGraphClient, KnowledgeGraphSource};
pub use matcher::EntityMatcher;
pub use normalize::normalize_name;
pub use scorer::MatchScorer;
pub use types::{
    CanonicalEntity, DebugCandidate, DebugListing, EntityRecord, MatchResult, RawCandidate,
    ScoredCandidate, SearchQuery, SearchResponse,
};
