//! Domain error types.

use event_store::EventStoreError;
use thiserror::Error;

use crate::category::CategoryError;
use crate::constraint::ConstraintError;
use crate::id_sequence::IdSequenceError;
use crate::user::UserError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Event store error: {0}")]
    EventStore(#[from] EventStoreError),

    #[error("User error: {0}")]
    User(#[from] UserError),

    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    #[error("Constraint error: {0}")]
    Constraint(#[from] ConstraintError),

    #[error("Id sequence error: {0}")]
    IdSequence(#[from] IdSequenceError),

    #[error("Aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// Every attempt lost the race against a concurrent writer.
    #[error("Gave up on aggregate {aggregate_id} after {attempts} concurrent modifications")]
    ConcurrencyRetriesExhausted {
        aggregate_id: String,
        attempts: usize,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
