//! User domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::DomainEvent;

use super::{EmailAddress, PasswordSha512, SecurityToken, UserName};

/// Events that can occur on a user aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UserEvent {
    UserCreated(UserCreatedData),
    UserPasswordChanged(UserPasswordChangedData),
    UserEmailVerified(UserEmailVerifiedData),
}

impl DomainEvent for UserEvent {
    fn event_type(&self) -> &'static str {
        match self {
            UserEvent::UserCreated(_) => "UserCreated",
            UserEvent::UserPasswordChanged(_) => "UserPasswordChanged",
            UserEvent::UserEmailVerified(_) => "UserEmailVerified",
        }
    }
}

/// Data for UserCreated event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreatedData {
    pub user_id: Uuid,
    pub user_name: UserName,
    pub email: EmailAddress,
    pub password_hash: PasswordSha512,

    /// Token the user must present to verify the email address.
    pub verification_token: SecurityToken,
    pub created_at: DateTime<Utc>,
}

/// Data for UserPasswordChanged event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPasswordChangedData {
    pub old_password_hash: PasswordSha512,
    pub new_password_hash: PasswordSha512,
    pub changed_at: DateTime<Utc>,
}

/// Data for UserEmailVerified event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEmailVerifiedData {
    pub verified_at: DateTime<Utc>,
}

impl UserEvent {
    pub fn user_created(
        user_id: Uuid,
        user_name: UserName,
        email: EmailAddress,
        password_hash: PasswordSha512,
        verification_token: SecurityToken,
    ) -> Self {
        UserEvent::UserCreated(UserCreatedData {
            user_id,
            user_name,
            email,
            password_hash,
            verification_token,
            created_at: Utc::now(),
        })
    }

    pub fn password_changed(
        old_password_hash: PasswordSha512,
        new_password_hash: PasswordSha512,
    ) -> Self {
        UserEvent::UserPasswordChanged(UserPasswordChangedData {
            old_password_hash,
            new_password_hash,
            changed_at: Utc::now(),
        })
    }

    pub fn email_verified() -> Self {
        UserEvent::UserEmailVerified(UserEmailVerifiedData {
            verified_at: Utc::now(),
        })
    }
}
