//! Category state machine.

use serde::{Deserialize, Serialize};

/// The lifecycle state of a category.
///
/// ```text
/// Initial ──► Active ──► MarkedForDeletion ──► Deleted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryState {
    #[default]
    Initial,
    Active,
    MarkedForDeletion,

    /// Terminal.
    Deleted,
}

impl CategoryState {
    pub fn can_mark_for_deletion(&self) -> bool {
        matches!(self, CategoryState::Active)
    }

    pub fn can_delete(&self) -> bool {
        matches!(self, CategoryState::MarkedForDeletion)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryState::Initial => "INITIAL",
            CategoryState::Active => "ACTIVE",
            CategoryState::MarkedForDeletion => "MARKED_FOR_DELETION",
            CategoryState::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for CategoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
