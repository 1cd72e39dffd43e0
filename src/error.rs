//! Error types for athena-review.
//!
//! Defines the main error enum used throughout the application.

use std::time::Duration;
use thiserror::Error;

/// Main error type for athena-review operations.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// The query service rejected the submission (auth, validation, transport).
    #[error("Submission error: {0}")]
    Submission(String),

    /// No terminal state was reached within the timeout.
    #[error("Query not completed after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The service reported the query as failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The query was cancelled outside of this process.
    #[error("Query cancelled: {0}")]
    QueryCancelled(String),

    /// The service answered with something outside its contract.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A submission listener failed after the query was accepted.
    #[error("Listener error for query {query_id}: {message}")]
    Listener { query_id: String, message: String },

    /// Transport errors while polling or paging through results.
    #[error("Service error: {0}")]
    Service(String),

    /// Output location or artifact retrieval errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Result artifact could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReviewError {
    /// Creates a submission error with the given message.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Creates a query failed error carrying the service-provided reason.
    pub fn query_failed(reason: impl Into<String>) -> Self {
        Self::QueryFailed(reason.into())
    }

    /// Creates a query cancelled error carrying the service-provided reason.
    pub fn query_cancelled(reason: impl Into<String>) -> Self {
        Self::QueryCancelled(reason.into())
    }

    /// Creates a protocol error with the given message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Creates a listener error for an already submitted query.
    pub fn listener(query_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Listener {
            query_id: query_id.into(),
            message: msg.into(),
        }
    }

    /// Creates a service error with the given message.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Creates a storage error with the given message.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates a parse error with the given message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Submission(_) => "Submission Error",
            Self::Timeout(_) => "Timeout Error",
            Self::QueryFailed(_) => "Query Failed",
            Self::QueryCancelled(_) => "Query Cancelled",
            Self::Protocol(_) => "Protocol Error",
            Self::Listener { .. } => "Listener Error",
            Self::Service(_) => "Service Error",
            Self::Storage(_) => "Storage Error",
            Self::Parse(_) => "Parse Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns true for the states a query can end in on the service side.
    pub fn is_terminal_query_state(&self) -> bool {
        matches!(self, Self::QueryFailed(_) | Self::QueryCancelled(_))
    }
}

/// Result type alias using ReviewError.
pub type Result<T> = std::result::Result<T, ReviewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_submission() {
        let err = ReviewError::submission("AccessDeniedException");
        assert_eq!(err.to_string(), "Submission error: AccessDeniedException");
        assert_eq!(err.category(), "Submission Error");
    }

    #[test]
    fn test_error_display_timeout() {
        let err = ReviewError::Timeout(Duration::from_secs(300));
        assert_eq!(err.to_string(), "Query not completed after 300s");
        assert_eq!(err.category(), "Timeout Error");
    }

    #[test]
    fn test_error_display_query_failed() {
        let err = ReviewError::query_failed("Syntax error");
        assert_eq!(err.to_string(), "Query failed: Syntax error");
        assert!(err.is_terminal_query_state());
    }

    #[test]
    fn test_error_display_listener() {
        let err = ReviewError::listener("q-1", "audit sink unavailable");
        assert_eq!(
            err.to_string(),
            "Listener error for query q-1: audit sink unavailable"
        );
        assert_eq!(err.category(), "Listener Error");
        assert!(!err.is_terminal_query_state());
    }

    #[test]
    fn test_error_display_config() {
        let err = ReviewError::config("missing field 'output_location' in athena");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing field 'output_location' in athena"
        );
        assert_eq!(err.category(), "Configuration Error");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReviewError>();
    }
}
