//! Knowledge Graph business lookup
//!
//! Resolves a business name (plus optional location or known KG ID) to the
//! single best-matching entity in the Knowledge Graph Search API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Callers: kg-lookup-web (POST /api/knowledge-graph), kg_lookup  │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    EntityMatcher                                 │
//! │  direct ID lookup → query variants × type filters → best match  │
//! └─────────────────────────────────────────────────────────────────┘
//!          │                    │                     │
//!          ▼                    ▼                     ▼
//! ┌────────────────┐  ┌──────────────────┐  ┌──────────────────────┐
//! │ normalize_name │  │   MatchScorer    │  │  CanonicalEntity     │
//! │ (suffix strip) │  │ (composite score)│  │  (extraction)        │
//! └────────────────┘  └──────────────────┘  └──────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │          KnowledgeGraphSource (KnowledgeGraphClient)             │
//! │        GET entities:search  (query=… | ids=…)                   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use kg_lookup::{EntityMatcher, KgConfig, KnowledgeGraphClient, MatchPolicy};
//!
//! let client = KnowledgeGraphClient::new(KgConfig::from_env()?)?;
//! let matcher = EntityMatcher::new(Arc::new(client), MatchPolicy::from_env());
//! let result = matcher.find_business("Starbucks", Some("Seattle"), None).await;
//! ```

pub mod config;
pub mod error;
pub mod knowledge_graph;
pub mod usage;

pub use config::{KgConfig, MatchPolicy};
pub use error::KgError;
pub use knowledge_graph::{
    normalize_name, CanonicalEntity, DebugCandidate, DebugListing, EntityMatcher, EntityRecord,
    KnowledgeGraphClient, KnowledgeGraphSource, MatchResult, MatchScorer, RawCandidate,
    ScoredCandidate, SearchQuery, SearchResponse,
};
pub use usage::{ApiKind, UsageSnapshot, UsageTracker};
