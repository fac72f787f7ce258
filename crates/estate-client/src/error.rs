//! # Client Error Types
//!
//! Error types for backend calls.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Remote              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Unauthorized (401/403) │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  NotFound (404)         │ │
//! │  │  ConfigLoad/Save│  │                 │  │  Conflict (409)         │ │
//! │  │  MissingSession │  │                 │  │  Status / Rejected      │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │     Decode      │  │   Validation    │                              │
//! │  │  bad envelope   │  │  (never sent)   │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are retried automatically. A failed write is reported once.

use estate_core::ValidationError;
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every way a backend call can fail.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid base URL or path.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// No bearer token; the operator is logged out.
    #[error("Not signed in")]
    MissingSession,

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request never got a response.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// 401 or 403: token missing, expired or lacking permission.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 409: a record with the same identity already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// 2xx with `success: false` in the envelope.
    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    // =========================================================================
    // Decode Errors
    // =========================================================================
    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// Input rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidConfig(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Maps a non-success HTTP status and its body to an error.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ClientError::Unauthorized(message),
            404 => ClientError::NotFound(message),
            409 => ClientError::Conflict(message),
            status => ClientError::Status { status, message },
        }
    }

    /// Returns true for a 409 duplicate.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Conflict(_))
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
                | ClientError::MissingSession
        )
    }

    /// Returns true if the backend was never reached or never answered.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, ClientError::Http(_) | ClientError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(ClientError::from_status(401, ""), ClientError::Unauthorized(_)));
        assert!(matches!(ClientError::from_status(403, ""), ClientError::Unauthorized(_)));
        assert!(matches!(ClientError::from_status(404, ""), ClientError::NotFound(_)));
        assert!(ClientError::from_status(409, "dup").is_conflict());
        assert!(matches!(
            ClientError::from_status(500, "boom"),
            ClientError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_categories() {
        assert!(ClientError::Timeout(30).is_transport_error());
        assert!(ClientError::Http("refused".into()).is_transport_error());
        assert!(!ClientError::Conflict("dup".into()).is_transport_error());

        assert!(ClientError::MissingSession.is_config_error());
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(!ClientError::NotFound("flat".into()).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Status {
            status: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.to_string(), "Backend returned 502: bad gateway");
    }
}
