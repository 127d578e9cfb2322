//! Error taxonomy for Knowledge Graph lookups.
//!
//! Every per-call transport outcome maps to one variant. Only `Config` is
//! fatal for a whole lookup; the rest are recoverable by trying the next
//! query/type variant.

use reqwest::StatusCode;

/// Maximum number of body characters carried in an `Api` error
const MAX_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KgError {
    /// Missing or invalid API credential / client setup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// 403 from the provider - key missing permissions or API not enabled.
    #[error("Access denied. Check API key and enable Knowledge Graph Search API.")]
    AccessDenied,

    /// 429 from the provider.
    #[error("API quota exceeded. Try again later.")]
    QuotaExceeded,

    /// Any other non-200 status.
    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// No response within the configured per-call timeout.
    #[error("Request timeout after {secs} seconds")]
    Timeout { secs: u64 },

    /// Transport failure before any HTTP response.
    #[error("Network error: {0}")]
    Network(String),

    /// Direct-ID lookup succeeded but returned zero entities.
    #[error("No entity found for KG ID: {0}")]
    NotFound(String),

    /// 200 response whose body could not be decoded.
    #[error("Failed to parse Knowledge Graph response: {0}")]
    Parse(String),
}

impl KgError {
    /// Stable machine-readable code, as exposed in JSON responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "API_CONFIG_ERROR",
            Self::AccessDenied => "API_ACCESS_DENIED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::Api { .. } => "API_ERROR",
            Self::Timeout { .. } => "TIMEOUT",
            Self::Network(_) => "NETWORK_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Parse(_) => "PARSE_ERROR",
        }
    }

    /// Whether the orchestrator may move on to the next search variant.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::FORBIDDEN => Self::AccessDenied,
            StatusCode::TOO_MANY_REQUESTS => Self::QuotaExceeded,
            other => Self::Api {
                status: other.as_u16(),
                body: body.chars().take(MAX_BODY_CHARS).collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            KgError::from_status(StatusCode::FORBIDDEN, "denied"),
            KgError::AccessDenied
        );
        assert_eq!(
            KgError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            KgError::QuotaExceeded
        );
        assert_eq!(
            KgError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            KgError::Api {
                status: 502,
                body: "upstream".to_string()
            }
        );
    }

    #[test]
    fn test_api_body_is_truncated() {
        let body = "x".repeat(1000);
        match KgError::from_status(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            KgError::Api { body, .. } => assert_eq!(body.len(), 200),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_codes_and_recoverability() {
        assert_eq!(KgError::Config("x".into()).code(), "API_CONFIG_ERROR");
        assert_eq!(KgError::Timeout { secs: 30 }.code(), "TIMEOUT");
        assert_eq!(KgError::Network("refused".into()).code(), "NETWORK_ERROR");
        assert_eq!(KgError::NotFound("/g/1".into()).code(), "NOT_FOUND");

        assert!(!KgError::Config("x".into()).is_recoverable());
        assert!(KgError::AccessDenied.is_recoverable());
        assert!(KgError::QuotaExceeded.is_recoverable());
        assert!(KgError::Timeout { secs: 30 }.is_recoverable());
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            KgError::Timeout { secs: 30 }.to_string(),
            "Request timeout after 30 seconds"
        );
    }
}
