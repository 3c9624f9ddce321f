//! Error types for publisher tool operations.

use thiserror::Error;

/// Main error type for publisher operations.
///
/// Runtime variants are converted into tool error payloads at the tool
/// boundary. `InvalidConfig` and `DuplicatePublication` only occur while
/// building the registry at startup.
#[derive(Error, Debug)]
pub enum PublisherError {
    /// No API keys configured at all
    #[error(
        "No API keys configured. Set SUBSTACK_API_KEY or SUBSTACK_API_KEY_<NAME> environment variables."
    )]
    Configuration,

    /// Several publications configured and none was named
    #[error(
        "Multiple publications configured ({}). Specify the 'publication' parameter.",
        .0.join(", ")
    )]
    AmbiguousTarget(Vec<String>),

    /// Named publication or remote resource does not exist
    #[error("{message}")]
    NotFound {
        status: Option<u16>,
        message: String,
    },

    /// Upstream rejected the API key (HTTP 401)
    #[error("Unauthorized (401): Invalid API key. {0}")]
    Authentication(String),

    /// Upstream rate limit hit (HTTP 429)
    #[error("Rate limited (429): {0}")]
    RateLimited(String),

    /// Any other non-2xx upstream response
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// No usable response was obtained from upstream
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid startup configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Two configuration sources normalize to the same publication name
    #[error("duplicate publication name '{name}': defined by both {first} and {second}")]
    DuplicatePublication {
        name: String,
        first: String,
        second: String,
    },
}

impl PublisherError {
    /// Build the not-found error for an unknown publication name.
    pub fn unknown_publication(requested: &str, available: &[String]) -> Self {
        PublisherError::NotFound {
            status: None,
            message: format!(
                "Publication \"{}\" not found. Available: {}",
                requested,
                available.join(", ")
            ),
        }
    }

    /// Build the not-found error for an upstream 404 response.
    pub fn remote_not_found(body: &str) -> Self {
        PublisherError::NotFound {
            status: Some(404),
            message: format!("Not found (404): {}", body),
        }
    }

    /// Stable snake_case tag, surfaced as `kind` in tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            PublisherError::Configuration => "configuration",
            PublisherError::AmbiguousTarget(_) => "ambiguous_target",
            PublisherError::NotFound { .. } => "not_found",
            PublisherError::Authentication(_) => "authentication",
            PublisherError::RateLimited(_) => "rate_limited",
            PublisherError::Api { .. } => "api",
            PublisherError::Transport(_) => "transport",
            PublisherError::InvalidConfig(_) => "invalid_config",
            PublisherError::DuplicatePublication { .. } => "duplicate_publication",
        }
    }

    /// HTTP status carried by upstream failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            PublisherError::NotFound { status, .. } => *status,
            PublisherError::Authentication(_) => Some(401),
            PublisherError::RateLimited(_) => Some(429),
            PublisherError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for publisher operations
pub type Result<T> = std::result::Result<T, PublisherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_target_display() {
        let err = PublisherError::AmbiguousTarget(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            err.to_string(),
            "Multiple publications configured (a, b). Specify the 'publication' parameter."
        );
    }

    #[test]
    fn test_remote_not_found_display() {
        let err = PublisherError::remote_not_found("post not found");
        assert_eq!(err.to_string(), "Not found (404): post not found");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_unknown_publication_has_no_status() {
        let err = PublisherError::unknown_publication("sf", &["ny".to_string(), "la".to_string()]);
        assert_eq!(err.to_string(), "Publication \"sf\" not found. Available: ny, la");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_api_error_display() {
        let err = PublisherError::Api {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error (503): maintenance");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.kind(), "api");
    }

    #[test]
    fn test_authentication_display() {
        let err = PublisherError::Authentication("bad key".to_string());
        assert_eq!(
            err.to_string(),
            "Unauthorized (401): Invalid API key. bad key"
        );
        assert_eq!(err.status(), Some(401));
    }
}
