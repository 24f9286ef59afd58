use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an aggregate instance.
///
/// Users are identified by a random UUID, categories by a number drawn from
/// a monotonically increasing sequence. Both kinds share one type so the
/// event store and the read side can key on it uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateId {
    /// UUID-based identifier.
    Uuid(Uuid),
    /// Sequence-based identifier.
    Long(i64),
}

impl AggregateId {
    /// Creates a new random UUID aggregate ID.
    pub fn new() -> Self {
        Self::Uuid(Uuid::new_v4())
    }

    /// Creates an aggregate ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }

    /// Creates an aggregate ID from a sequence number.
    pub fn from_long(value: i64) -> Self {
        Self::Long(value)
    }

    /// Returns the underlying UUID, if this is a UUID identifier.
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(uuid) => Some(*uuid),
            Self::Long(_) => None,
        }
    }

    /// Returns the underlying number, if this is a sequence identifier.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(value) => Some(*value),
            Self::Uuid(_) => None,
        }
    }

    /// Parses a canonical UUID string.
    pub fn parse_uuid(s: &str) -> Result<Self, ParseAggregateIdError> {
        Uuid::parse_str(s)
            .map(Self::Uuid)
            .map_err(|_| ParseAggregateIdError(s.to_string()))
    }

    /// Parses a decimal sequence number.
    pub fn parse_long(s: &str) -> Result<Self, ParseAggregateIdError> {
        s.parse::<i64>()
            .map(Self::Long)
            .map_err(|_| ParseAggregateIdError(s.to_string()))
    }
}

impl Default for AggregateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AggregateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uuid(uuid) => write!(f, "{uuid}"),
            Self::Long(value) => write!(f, "{value}"),
        }
    }
}

impl From<Uuid> for AggregateId {
    fn from(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }
}

impl From<i64> for AggregateId {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

/// Error returned when a string is not a valid aggregate identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAggregateIdError(pub String);

impl std::fmt::Display for ParseAggregateIdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid aggregate id: '{}'", self.0)
    }
}

impl std::error::Error for ParseAggregateIdError {}
