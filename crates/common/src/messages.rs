//! Messages sent from the command side to the read side.
//!
//! Messages carry only what the read model needs. Passwords only ever travel
//! as hashes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::AggregateId;

/// A typed message payload with a stable type tag.
pub trait AuctionMessage: Serialize + DeserializeOwned {
    /// Type tag used for routing on the receiving side.
    const MESSAGE_TYPE: &'static str;

    /// The aggregate the message is about.
    fn aggregate_id(&self) -> AggregateId;
}

/// Transport wrapper around a message payload.
///
/// `version` is the aggregate version after the event the message was made
/// from. Receivers use it to drop redelivered or stale messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEnvelope {
    pub message_id: Uuid,
    pub message_type: String,
    pub aggregate_id: AggregateId,
    pub version: i64,
    pub published_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl MessageEnvelope {
    /// Wraps a typed message produced at the given aggregate version.
    pub fn wrap<M: AuctionMessage>(
        message: &M,
        version: i64,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            message_id: Uuid::new_v4(),
            message_type: M::MESSAGE_TYPE.to_string(),
            aggregate_id: message.aggregate_id(),
            version,
            published_at: Utc::now(),
            payload: serde_json::to_value(message)?,
        })
    }

    /// Decodes the payload as the given message type.
    pub fn decode<M: AuctionMessage>(&self) -> Result<M, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreatedMessage {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
}

impl AuctionMessage for UserCreatedMessage {
    const MESSAGE_TYPE: &'static str = "UserCreated";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::from_uuid(self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmailVerifiedMessage {
    pub user_id: Uuid,
}

impl AuctionMessage for UserEmailVerifiedMessage {
    const MESSAGE_TYPE: &'static str = "UserEmailVerified";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::from_uuid(self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPasswordChangedMessage {
    pub user_id: Uuid,
    pub password_hash: String,
}

impl AuctionMessage for UserPasswordChangedMessage {
    const MESSAGE_TYPE: &'static str = "UserPasswordChanged";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::from_uuid(self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCreatedMessage {
    pub category_id: i64,
    pub name: String,
}

impl AuctionMessage for CategoryCreatedMessage {
    const MESSAGE_TYPE: &'static str = "CategoryCreated";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::from_long(self.category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMarkedForDeletionMessage {
    pub category_id: i64,
}

impl AuctionMessage for CategoryMarkedForDeletionMessage {
    const MESSAGE_TYPE: &'static str = "CategoryMarkedForDeletion";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::from_long(self.category_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDeletedMessage {
    pub category_id: i64,
}

impl AuctionMessage for CategoryDeletedMessage {
    const MESSAGE_TYPE: &'static str = "CategoryDeleted";

    fn aggregate_id(&self) -> AggregateId {
        AggregateId::from_long(self.category_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_type_tag_and_aggregate() {
        let message = UserEmailVerifiedMessage {
            user_id: Uuid::new_v4(),
        };
        let envelope = MessageEnvelope::wrap(&message, 2).unwrap();

        assert_eq!(envelope.message_type, "UserEmailVerified");
        assert_eq!(envelope.version, 2);
        assert_eq!(envelope.aggregate_id, AggregateId::from_uuid(message.user_id));
        assert_eq!(envelope.decode::<UserEmailVerifiedMessage>().unwrap(), message);
    }

    #[test]
    fn decode_as_wrong_type_fails() {
        let message = CategoryMarkedForDeletionMessage { category_id: 3 };
        let envelope = MessageEnvelope::wrap(&message, 2).unwrap();

        assert!(envelope.decode::<UserCreatedMessage>().is_err());
    }
}
