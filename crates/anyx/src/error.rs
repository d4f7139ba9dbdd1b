//! Error types for anyx

use thiserror::Error;

/// Prefix carried by every configuration error message.
///
/// Callers match on it to tell a misconfigured deployment apart from a runtime failure.
pub const CONFIG_ERROR_PREFIX: &str = "CRITICAL_CONFIG_ERROR";

/// Message returned for every transport-level failure.
pub const NETWORK_ERROR_MESSAGE: &str = "Network request failed. Could not connect to the backend.";

/// Result type alias for anyx operations
pub type AnyxResult<T> = Result<T, AnyxError>;

/// Error types for query execution
#[derive(Debug, Error)]
pub enum AnyxError {
    /// Required connection settings are missing. Raised before any network I/O.
    #[error("{}: {}", CONFIG_ERROR_PREFIX, .0)]
    Config(String),

    /// Non-2xx response whose body carried an `error` message.
    #[error("{0}")]
    Server(String),

    /// Non-2xx response with a body that could not be interpreted.
    #[error("Query failed with status: {status} and response: {body}")]
    Status { status: u16, body: String },

    /// The request never produced a usable response.
    ///
    /// The underlying cause is logged, not carried.
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network,

    /// Builder state rejected before execution
    #[error("Validation error: {0}")]
    Validation(String),

    /// Payload encoding error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Result could not be mapped into the requested type
    #[error("Decode error: {0}")]
    Decode(String),
}

impl AnyxError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is the generic network error
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Check if the backend reported this error (with or without a JSON message)
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Status { .. })
    }

    /// HTTP status for errors built from an unparseable error response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AnyxError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_is_prefixed() {
        let err = AnyxError::config("missing VITE_PROJECT_ID");
        assert!(err.to_string().starts_with(CONFIG_ERROR_PREFIX));
        assert!(err.is_config());
        assert!(!err.is_network());
    }

    #[test]
    fn server_error_displays_message_verbatim() {
        let err = AnyxError::Server("not found".to_string());
        assert_eq!(err.to_string(), "not found");
        assert!(err.is_server());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn status_error_embeds_status_and_body() {
        let err = AnyxError::Status {
            status: 500,
            body: "oops".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("oops"));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_error_is_generic() {
        assert_eq!(AnyxError::Network.to_string(), NETWORK_ERROR_MESSAGE);
    }
}
