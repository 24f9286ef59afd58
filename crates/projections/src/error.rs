//! Projection error types.

use thiserror::Error;

/// Errors that can occur while applying a message to a read model.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Failed to deserialize a message payload.
    #[error("Message deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// A state-change message arrived for a row that does not exist.
    #[error("{view} has no row for aggregate {aggregate_id}")]
    RowNotFound {
        view: &'static str,
        aggregate_id: String,
    },

    /// A message was routed to a view that does not handle its type.
    #[error("{view} does not handle {message_type} messages")]
    UnexpectedMessage {
        view: &'static str,
        message_type: String,
    },
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;
