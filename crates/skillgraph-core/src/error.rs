//! Error types for Skillgraph

use thiserror::Error;

/// Result type alias using Skillgraph's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Skillgraph error types with stable codes and remediation hints
#[derive(Error, Debug)]
pub enum Error {
    // Store errors (E100-E199)
    #[error("Graph store unavailable: {0}. Check SKILLGRAPH_DATABASE_URL and that the server is reachable.")]
    StoreUnavailable(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    QueryFailed(#[from] sqlx::Error),

    #[error("Query timed out after {0} seconds")]
    QueryTimeout(u64),

    // Decode errors (E200-E299)
    #[error("Could not decode graph literal: {reason} (raw: {raw})")]
    DecodeDegraded { raw: String, reason: String },

    // Taxonomy errors (E300-E399)
    #[error("Cycle detected in CONTAINS edges at node {0}")]
    CycleDetected(i64),

    // Input errors (E400-E499)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // Generic errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a decode error from the raw literal and a reason
    pub fn decode(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DecodeDegraded {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "E100",
            Self::QueryFailed(_) => "E101",
            Self::QueryTimeout(_) => "E102",
            Self::DecodeDegraded { .. } => "E200",
            Self::CycleDetected(_) => "E300",
            Self::InvalidInput(_) => "E400",
            Self::ConfigError(_) => "E600",
            Self::Serialization(_) => "E700",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Classify a driver error: connection-level failures are `StoreUnavailable`
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Configuration(_) => Self::StoreUnavailable(err),
            other => Self::QueryFailed(other),
        }
    }

    /// Whether the error means the store could not be reached at all
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::QueryTimeout(_))
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::StoreUnavailable(_) => Some("skillgraph doctor".to_string()),
            Self::QueryTimeout(_) => {
                Some("skillgraph config set graph.query_timeout_secs <seconds>".to_string())
            }
            Self::DecodeDegraded { .. } => {
                Some("skillgraph config set graph.strict_decoding false".to_string())
            }
            Self::ConfigError(_) => Some("skillgraph config list".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_error() {
        let error = Error::StoreUnavailable(sqlx::Error::PoolTimedOut);
        assert_eq!(error.code(), "E100");
        assert!(error.is_unavailable());
        assert_eq!(error.suggestion(), Some("skillgraph doctor".to_string()));
    }

    #[test]
    fn test_query_failed_from_sqlx() {
        let error: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(error.code(), "E101");
        assert!(!error.is_unavailable());
    }

    #[test]
    fn test_from_sqlx_classifies_connection_errors() {
        assert_eq!(Error::from_sqlx(sqlx::Error::PoolClosed).code(), "E100");
        assert_eq!(Error::from_sqlx(sqlx::Error::RowNotFound).code(), "E101");
    }

    #[test]
    fn test_decode_error_keeps_raw_literal() {
        let error = Error::decode("{broken::vertex", "expected object");
        assert_eq!(error.code(), "E200");
        let message = error.to_string();
        assert!(message.contains("{broken::vertex"));
        assert!(message.contains("expected object"));
    }

    #[test]
    fn test_cycle_detected_error() {
        let error = Error::CycleDetected(42);
        assert_eq!(error.code(), "E300");
        assert_eq!(error.suggestion(), None);
        assert!(error.to_string().contains("42"));
    }

    #[test]
    fn test_timeout_is_unavailable() {
        let error = Error::QueryTimeout(30);
        assert_eq!(error.code(), "E102");
        assert!(error.is_unavailable());
        assert!(error.to_string().contains("30"));
    }
}
