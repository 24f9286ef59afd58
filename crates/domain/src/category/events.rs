//! Category domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::CategoryName;

/// Events that can occur on a category aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CategoryEvent {
    CategoryCreated(CategoryCreatedData),
    CategoryMarkedForDeletion(CategoryMarkedForDeletionData),
    CategoryDeleted(CategoryDeletedData),
}

impl DomainEvent for CategoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CategoryEvent::CategoryCreated(_) => "CategoryCreated",
            CategoryEvent::CategoryMarkedForDeletion(_) => "CategoryMarkedForDeletion",
            CategoryEvent::CategoryDeleted(_) => "CategoryDeleted",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreatedData {
    pub category_id: i64,
    pub name: CategoryName,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryMarkedForDeletionData {
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDeletedData {
    pub deleted_at: DateTime<Utc>,
}

impl CategoryEvent {
    pub fn created(category_id: i64, name: CategoryName) -> Self {
        CategoryEvent::CategoryCreated(CategoryCreatedData {
            category_id,
            name,
            created_at: Utc::now(),
        })
    }

    pub fn marked_for_deletion() -> Self {
        CategoryEvent::CategoryMarkedForDeletion(CategoryMarkedForDeletionData {
            marked_at: Utc::now(),
        })
    }

    pub fn deleted() -> Self {
        CategoryEvent::CategoryDeleted(CategoryDeletedData {
            deleted_at: Utc::now(),
        })
    }
}
