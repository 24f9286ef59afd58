//! Users read model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    AuctionMessage, MessageEnvelope, UserCreatedMessage, UserEmailVerifiedMessage,
    UserPasswordChangedMessage,
};
use domain::UserState;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProjectionError;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;
use crate::Result;

const VIEW: &str = "UsersView";

/// A registered user as seen by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub state: UserState,
    /// Aggregate version of the last applied message.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model of all registered users.
#[derive(Clone, Default)]
pub struct UsersView {
    users: Arc<RwLock<HashMap<Uuid, UserRow>>>,
    position: Arc<RwLock<ProjectionPosition>>,
}

impl UsersView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_user(&self, user_id: Uuid) -> Option<UserRow> {
        self.users.read().await.get(&user_id).cloned()
    }

    /// All users ordered by name.
    pub async fn get_all_users(&self) -> Vec<UserRow> {
        let mut users: Vec<_> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        users
    }

    pub async fn find_by_name(&self, user_name: &str) -> Option<UserRow> {
        self.users
            .read()
            .await
            .values()
            .find(|u| u.user_name == user_name)
            .cloned()
    }

    /// Applies a state change unless the row already reflects its version.
    async fn update(
        &self,
        user_id: Uuid,
        message: &MessageEnvelope,
        change: impl FnOnce(&mut UserRow),
    ) -> Result<()> {
        let mut users = self.users.write().await;
        let row = users
            .get_mut(&user_id)
            .ok_or_else(|| ProjectionError::RowNotFound {
                view: VIEW,
                aggregate_id: user_id.to_string(),
            })?;
        if message.version <= row.version {
            tracing::debug!(
                %user_id,
                message_version = message.version,
                row_version = row.version,
                "stale user message skipped"
            );
            return Ok(());
        }
        change(row);
        row.version = message.version;
        row.updated_at = message.published_at;
        Ok(())
    }
}

#[async_trait]
impl Projection for UsersView {
    fn name(&self) -> &'static str {
        VIEW
    }

    fn message_types(&self) -> &'static [&'static str] {
        &[
            UserCreatedMessage::MESSAGE_TYPE,
            UserEmailVerifiedMessage::MESSAGE_TYPE,
            UserPasswordChangedMessage::MESSAGE_TYPE,
        ]
    }

    async fn handle(&self, message: &MessageEnvelope) -> Result<()> {
        let at = message.published_at;

        match message.message_type.as_str() {
            UserCreatedMessage::MESSAGE_TYPE => {
                let created: UserCreatedMessage = message.decode()?;
                let mut users = self.users.write().await;
                if users.contains_key(&created.user_id) {
                    tracing::debug!(user_id = %created.user_id, "user row already exists");
                } else {
                    users.insert(
                        created.user_id,
                        UserRow {
                            user_id: created.user_id,
                            user_name: created.user_name,
                            email: created.email,
                            password_hash: created.password_hash,
                            state: UserState::New,
                            version: message.version,
                            created_at: at,
                            updated_at: at,
                        },
                    );
                }
            }
            UserEmailVerifiedMessage::MESSAGE_TYPE => {
                let verified: UserEmailVerifiedMessage = message.decode()?;
                self.update(verified.user_id, message, |row| row.state = UserState::Active)
                    .await?;
            }
            UserPasswordChangedMessage::MESSAGE_TYPE => {
                let changed: UserPasswordChangedMessage = message.decode()?;
                self.update(changed.user_id, message, |row| {
                    row.password_hash = changed.password_hash
                })
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
        self.users.write().await.clear();
        *self.position.write().await = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for UsersView {
    fn name(&self) -> &'static str {
        VIEW
    }

    fn count(&self) -> usize {
        // Use try_read to avoid blocking; returns 0 if lock is held
        self.users.try_read().map(|u| u.len()).unwrap_or(0)
    }
}
