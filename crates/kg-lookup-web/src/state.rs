//! Shared application state
//!
//! Cloned into every handler. Everything mutable lives behind the session
//! store and usage tracker, which are internally synchronized.

use kg_lookup::{EntityMatcher, UsageTracker};

use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured; lookups then answer 500.
    pub matcher: Option<EntityMatcher>,
    pub sessions: SessionStore,
    pub usage: UsageTracker,
    /// Whether a Places API key is present (reported by `/api/status`)
    pub places_enabled: bool,
    /// Enables `/api/test-kg`
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(matcher: Option<EntityMatcher>, places_enabled: bool, debug_mode: bool) -> Self {
        Self {
            matcher,
            sessions: SessionStore::new(),
            usage: UsageTracker::new(),
            places_enabled,
            debug_mode,
        }
    }
}
