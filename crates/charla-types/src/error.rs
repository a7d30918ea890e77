//! Error types shared across the charla crates.
//!
//! Only the boundaries that cross an unreliable external service model
//! failure explicitly (summarization, transport sends, snapshot I/O).
//! Store and retention operations return empty/default values for expected
//! conditions instead of raising.

use thiserror::Error;

/// Errors from the summarization gateway.
///
/// One failed call yields one failure result; there are no retries. Callers
/// surface these to the affected conversation instead of crashing.
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("rate limited by the model provider")]
    RateLimited,

    #[error("authentication with the model provider failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("model returned an empty completion")]
    EmptyCompletion,
}

/// Errors from the chat transport (sending messages to the platform).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat platform rejected the request: {description}")]
    Api { description: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed platform response: {0}")]
    MalformedResponse(String),
}

/// Errors from snapshot persistence.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encode error: {0}")]
    Encode(String),

    #[error("snapshot parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_error_display() {
        let err = SummaryError::Provider {
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: boom");
        assert_eq!(
            SummaryError::EmptyCompletion.to_string(),
            "model returned an empty completion"
        );
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Api {
            description: "chat not found".to_string(),
        };
        assert!(err.to_string().contains("chat not found"));
    }

    #[test]
    fn test_snapshot_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: SnapshotError = io.into();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
