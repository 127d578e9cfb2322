//! Lookup configuration
//!
//! `KgConfig` holds everything the HTTP client needs; `MatchPolicy` holds the
//! thresholds the matcher applies to composite scores.

use std::str::FromStr;
use std::time::Duration;

use crate::error::KgError;

/// Knowledge Graph Search API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://kgsearch.googleapis.com/v1/entities:search";

/// Per-call timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credential env vars, in lookup order. The Maps key is shared with the map view.
const API_KEY_VARS: [&str; 2] = [PLACES_KEY_VAR, "GOOGLE_API_KEY"];

const PLACES_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

/// Client configuration
#[derive(Debug, Clone)]
pub struct KgConfig {
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl KgConfig {
    /// Create a config with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, KgError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(KgError::Config(
                "API key is required. Set GOOGLE_MAPS_API_KEY or GOOGLE_API_KEY.".to_string(),
            ));
        }
        Ok(Self {
            api_key: api_key.trim().to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Load from environment variables.
    ///
    /// A missing credential is a hard error, never a silent degradation.
    pub fn from_env() -> Result<Self, KgError> {
        let api_key = API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|value| !value.trim().is_empty())
            .ok_or_else(|| KgError::Config("Google Maps API key not configured".to_string()))?;

        Self::from_env_with_key(api_key)
    }

    /// Explicit credential; endpoint and timeout still come from
    /// `KG_SEARCH_ENDPOINT` / `KG_TIMEOUT_SECS` when set.
    pub fn from_env_with_key(api_key: impl Into<String>) -> Result<Self, KgError> {
        let mut config = Self::new(api_key)?;
        if let Ok(endpoint) = std::env::var("KG_SEARCH_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.endpoint = endpoint.trim().to_string();
            }
        }
        config.timeout = Duration::from_secs(env_or("KG_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Whether the Maps key itself is set. Places lookups need that key
/// specifically; `GOOGLE_API_KEY` only serves the Knowledge Graph.
pub fn places_key_present() -> bool {
    std::env::var(PLACES_KEY_VAR).is_ok_and(|v| !v.trim().is_empty())
}

/// Thresholds applied by `EntityMatcher`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Minimum composite score for a match to be reported (inclusive)
    pub acceptance_floor: f64,
    /// Composite score above which no further variants are tried (exclusive)
    pub short_circuit_threshold: f64,
    /// Result limit requested per search attempt
    pub search_limit: usize,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            acceptance_floor: 0.3,
            short_circuit_threshold: 0.8,
            search_limit: 20,
        }
    }
}

impl MatchPolicy {
    /// Defaults, overridden by `KG_ACCEPTANCE_FLOOR`, `KG_SHORT_CIRCUIT_THRESHOLD`
    /// and `KG_SEARCH_LIMIT` when set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            acceptance_floor: env_or("KG_ACCEPTANCE_FLOOR", defaults.acceptance_floor),
            short_circuit_threshold: env_or(
                "KG_SHORT_CIRCUIT_THRESHOLD",
                defaults.short_circuit_threshold,
            ),
            search_limit: env_or("KG_SEARCH_LIMIT", defaults.search_limit),
        }
    }

    pub fn accepts(&self, score: f64) -> bool {
        score >= self.acceptance_floor
    }

    pub fn is_confident(&self, score: f64) -> bool {
        score > self.short_circuit_threshold
    }
}

fn env_or<T: FromStr + Copy + std::fmt::Display>(var: &str, default: T) -> T {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var, value = %raw, default = %default, "Ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_key_is_config_error() {
        let err = KgConfig::new("   ").unwrap_err();
        assert_eq!(err.code(), "API_CONFIG_ERROR");
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = KgConfig::new(" key ").unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    // Only test in this crate that touches these variables.
    #[test]
    fn test_env_overrides_apply_to_explicit_key() {
        std::env::set_var("KG_SEARCH_ENDPOINT", "http://127.0.0.1:9/kg");
        std::env::set_var("GOOGLE_MAPS_API_KEY", " ");
        std::env::set_var("GOOGLE_API_KEY", "kg-only-key");

        let config = KgConfig::from_env_with_key("cli-key").unwrap();
        assert_eq!(config.api_key, "cli-key");
        assert_eq!(config.endpoint, "http://127.0.0.1:9/kg");

        // a Knowledge Graph key alone does not enable Places
        assert!(!places_key_present());
        assert_eq!(KgConfig::from_env().unwrap().api_key, "kg-only-key");

        std::env::set_var("GOOGLE_MAPS_API_KEY", "maps-key");
        assert!(places_key_present());

        std::env::remove_var("KG_SEARCH_ENDPOINT");
        std::env::remove_var("GOOGLE_MAPS_API_KEY");
        std::env::remove_var("GOOGLE_API_KEY");
    }

    #[test]
    fn test_policy_boundaries() {
        let policy = MatchPolicy::default();
        assert!(policy.accepts(0.3));
        assert!(!policy.accepts(0.29999));
        assert!(!policy.is_confident(0.8));
        assert!(policy.is_confident(0.80001));
        assert_eq!(policy.search_limit, 20);
    }
}
