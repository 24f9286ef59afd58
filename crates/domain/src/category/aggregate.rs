//! Category aggregate implementation.

use common::AggregateId;
use event_store::Version;

use crate::aggregate::Aggregate;

use super::{CategoryError, CategoryEvent, CategoryName, CategoryState};

/// Category aggregate root.
///
/// Categories are numbered from a sequence. Deletion is two-step: a category
/// is first marked for deletion and only then deleted.
#[derive(Debug, Clone, Default)]
pub struct Category {
    id: Option<i64>,
    version: Version,
    name: Option<CategoryName>,
    state: CategoryState,
}

impl Aggregate for Category {
    type Event = CategoryEvent;
    type Error = CategoryError;

    fn aggregate_type() -> &'static str {
        "Category"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id.map(AggregateId::from_long)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            CategoryEvent::CategoryCreated(data) => {
                self.id = Some(data.category_id);
                self.name = Some(data.name);
                self.state = CategoryState::Active;
            }
            CategoryEvent::CategoryMarkedForDeletion(_) => {
                self.state = CategoryState::MarkedForDeletion;
            }
            CategoryEvent::CategoryDeleted(_) => {
                self.state = CategoryState::Deleted;
            }
        }
    }
}

impl Category {
    pub fn category_id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> Option<&CategoryName> {
        self.name.as_ref()
    }

    pub fn state(&self) -> CategoryState {
        self.state
    }
}

impl Category {
    pub fn create(&self, category_id: i64, name: CategoryName) -> Result<CategoryEvent, CategoryError> {
        if self.id.is_some() {
            return Err(CategoryError::AlreadyCreated);
        }
        Ok(CategoryEvent::created(category_id, name))
    }

    pub fn mark_for_deletion(&self) -> Result<CategoryEvent, CategoryError> {
        if !self.state.can_mark_for_deletion() {
            return Err(CategoryError::IllegalCategoryState {
                expected: CategoryState::Active,
                actual: self.state,
            });
        }
        Ok(CategoryEvent::marked_for_deletion())
    }

    pub fn delete(&self) -> Result<CategoryEvent, CategoryError> {
        if !self.state.can_delete() {
            return Err(CategoryError::IllegalCategoryState {
                expected: CategoryState::MarkedForDeletion,
                actual: self.state,
            });
        }
        Ok(CategoryEvent::deleted())
    }
}
