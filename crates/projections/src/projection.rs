//! Core projection trait and position tracking.

use async_trait::async_trait;
use common::MessageEnvelope;

use crate::Result;

/// Tracks how many messages a projection has applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionPosition {
    /// Number of messages applied by this projection.
    pub messages_applied: u64,
}

impl ProjectionPosition {
    /// Creates a new position at zero.
    pub fn zero() -> Self {
        Self {
            messages_applied: 0,
        }
    }

    /// Advances the position by one message.
    pub fn advance(&self) -> Self {
        Self {
            messages_applied: self.messages_applied + 1,
        }
    }
}

impl std::fmt::Display for ProjectionPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position({})", self.messages_applied)
    }
}

/// A projection that applies read-side messages to a read model.
#[async_trait]
pub trait Projection: Send + Sync {
    /// Returns the name of this projection.
    fn name(&self) -> &'static str;

    /// Message types this projection wants to receive.
    fn message_types(&self) -> &'static [&'static str];

    /// Applies a single message to the projection's read model.
    async fn handle(&self, message: &MessageEnvelope) -> Result<()>;

    /// Returns the current position of this projection.
    async fn position(&self) -> ProjectionPosition;

    /// Resets the projection to its initial state.
    async fn reset(&self) -> Result<()>;
}
