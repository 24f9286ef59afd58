//! Category aggregate and related types.

mod aggregate;
mod events;
mod state;

pub use aggregate::Category;
pub use events::{
    CategoryCreatedData, CategoryDeletedData, CategoryEvent, CategoryMarkedForDeletionData,
};
pub use state::CategoryState;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display name of a category, unique among categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Creates a name, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors returned by category transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("Category already created")]
    AlreadyCreated,

    #[error("Illegal category state: expected {expected}, was {actual}")]
    IllegalCategoryState {
        expected: CategoryState,
        actual: CategoryState,
    },
}
