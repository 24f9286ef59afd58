//! Categories read model.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    AuctionMessage, CategoryCreatedMessage, CategoryDeletedMessage,
    CategoryMarkedForDeletionMessage, MessageEnvelope,
};
use domain::CategoryState;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::ProjectionError;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;
use crate::Result;

const VIEW: &str = "CategoriesView";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRow {
    pub category_id: i64,
    pub name: String,
    pub state: CategoryState,
    /// Aggregate version of the last applied message.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model of categories. Deleted categories stay with state `DELETED`.
#[derive(Clone, Default)]
pub struct CategoriesView {
    categories: Arc<RwLock<BTreeMap<i64, CategoryRow>>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl CategoriesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_category(&self, category_id: i64) -> Option<CategoryRow> {
        self.categories.read().await.get(&category_id).cloned()
    }

    /// All categories ordered by id.
    pub async fn get_all_categories(&self) -> Vec<CategoryRow> {
        self.categories.read().await.values().cloned().collect()
    }

    pub async fn get_categories_by_state(&self, state: CategoryState) -> Vec<CategoryRow> {
        self.categories
            .read()
            .await
            .values()
            .filter(|c| c.state == state)
            .cloned()
            .collect()
    }

    /// Moves a row to `state` unless it already reflects the message's version.
    async fn set_state(
        &self,
        category_id: i64,
        state: CategoryState,
        message: &MessageEnvelope,
    ) -> Result<()> {
        let mut categories = self.categories.write().await;
        let row = categories
            .get_mut(&category_id)
            .ok_or_else(|| ProjectionError::RowNotFound {
                view: VIEW,
                aggregate_id: category_id.to_string(),
            })?;
        if message.version <= row.version {
            tracing::debug!(
                category_id,
                message_version = message.version,
                row_version = row.version,
                "stale category message skipped"
            );
            return Ok(());
        }
        row.state = state;
        row.version = message.version;
        row.updated_at = message.published_at;
        Ok(())
    }
}

#[async_trait]
impl Projection for CategoriesView {
    fn name(&self) -> &'static str {
        VIEW
    }

    fn message_types(&self) -> &'static [&'static str] {
        &[
            CategoryCreatedMessage::MESSAGE_TYPE,
            CategoryMarkedForDeletionMessage::MESSAGE_TYPE,
            CategoryDeletedMessage::MESSAGE_TYPE,
        ]
    }

    async fn handle(&self, message: &MessageEnvelope) -> Result<()> {
        let at = message.published_at;

        match message.message_type.as_str() {
            CategoryCreatedMessage::MESSAGE_TYPE => {
                let created: CategoryCreatedMessage = message.decode()?;
                self.categories
                    .write()
                    .await
                    .entry(created.category_id)
                    .or_insert_with(|| CategoryRow {
                        category_id: created.category_id,
                        name: created.name,
                        state: CategoryState::Active,
                        version: message.version,
                        created_at: at,
                        updated_at: at,
                    });
            }
            CategoryMarkedForDeletionMessage::MESSAGE_TYPE => {
                let marked: CategoryMarkedForDeletionMessage = message.decode()?;
                self.set_state(marked.category_id, CategoryState::MarkedForDeletion, message)
                    .await?;
            }
            CategoryDeletedMessage::MESSAGE_TYPE => {
                let deleted: CategoryDeletedMessage = message.decode()?;
                self.set_state(deleted.category_id, CategoryState::Deleted, message)
                    .await?;
            }
            other => {
                return Err(ProjectionError::UnexpectedMessage {
                    view: VIEW,
                    message_type: other.to_string(),
                });
            }
        }

        let mut pos = self.position.write().await;
        *pos = pos.advance();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        *self.position.read().await
    }

    async fn reset(&self) -> Result<()> {
        self.categories.write().await.clear();
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for CategoriesView {
    fn name(&self) -> &'static str {
        VIEW
    }

    fn count(&self) -> usize {
        self.categories.try_read().map(|c| c.len()).unwrap_or(0)
    }
}
