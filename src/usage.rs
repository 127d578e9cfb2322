//! Per-session API usage counters
//!
//! Counters are atomics, so concurrent requests from one session never lose an
//! increment. The map lock is only held to find or create a session's entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Approximate cost per call in USD ($5 per 1000)
pub const COST_PER_CALL_USD: f64 = 0.005;

/// Which upstream API a call was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Places,
    Kg,
    /// Counted in the total only
    Other,
}

impl ApiKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "places" => Self::Places,
            "kg" => Self::Kg,
            _ => Self::Other,
        }
    }
}

#[derive(Debug)]
struct SessionUsage {
    places_api_calls: AtomicU64,
    kg_api_calls: AtomicU64,
    api_usage_today: AtomicU64,
    session_start: DateTime<Utc>,
}

impl SessionUsage {
    fn new() -> Self {
        Self {
            places_api_calls: AtomicU64::new(0),
            kg_api_calls: AtomicU64::new(0),
            api_usage_today: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    fn record(&self, kind: ApiKind, count: u64) {
        match kind {
            ApiKind::Places => saturating_increment(&self.places_api_calls, count),
            ApiKind::Kg => saturating_increment(&self.kg_api_calls, count),
            ApiKind::Other => {}
        }
        saturating_increment(&self.api_usage_today, count);
    }

    fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            places_api_calls: self.places_api_calls.load(Ordering::Relaxed),
            kg_api_calls: self.kg_api_calls.load(Ordering::Relaxed),
            api_usage_today: self.api_usage_today.load(Ordering::Relaxed),
            session_start: Some(self.session_start),
        }
    }
}

/// Counters stick at `u64::MAX` instead of wrapping
fn saturating_increment(counter: &AtomicU64, count: u64) {
    // the closure always returns Some, so this cannot fail
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
        Some(current.saturating_add(count))
    });
}

/// Point-in-time copy of one session's counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSnapshot {
    pub places_api_calls: u64,
    pub kg_api_calls: u64,
    /// Total across all API kinds
    pub api_usage_today: u64,
    /// `None` until the session records its first call
    pub session_start: Option<DateTime<Utc>>,
}

impl UsageSnapshot {
    pub fn typed_total(&self) -> u64 {
        self.places_api_calls.saturating_add(self.kg_api_calls)
    }
}

/// Estimated cost in USD, rounded to 4 decimal places
pub fn estimated_cost(calls: u64) -> f64 {
    (calls as f64 * COST_PER_CALL_USD * 10_000.0).round() / 10_000.0
}

/// Usage counters keyed by session id
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<SessionUsage>>>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` calls of `kind` and return the updated counters
    pub async fn record(&self, session_id: Uuid, kind: ApiKind, count: u64) -> UsageSnapshot {
        let usage = self.entry(session_id).await;
        usage.record(kind, count);
        usage.snapshot()
    }

    pub async fn snapshot(&self, session_id: Uuid) -> UsageSnapshot {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .map(|usage| usage.snapshot())
            .unwrap_or_default()
    }

    /// Drop a session's counters (logout)
    pub async fn forget(&self, session_id: Uuid) {
        self.sessions.write().await.remove(&session_id);
    }

    async fn entry(&self, session_id: Uuid) -> Arc<SessionUsage> {
        if let Some(existing) = self.sessions.read().await.get(&session_id) {
            return existing.clone();
        }
        self.sessions
            .write()
            .await
            .entry(session_id)
            .or_insert_with(|| Arc::new(SessionUsage::new()))
            .clone()
    }
}
