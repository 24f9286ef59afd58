//! Turns stored events into read-side messages.

use std::collections::HashMap;

use common::{
    AuctionMessage, CategoryCreatedMessage, CategoryDeletedMessage,
    CategoryMarkedForDeletionMessage, MessageEnvelope, UserCreatedMessage,
    UserEmailVerifiedMessage, UserPasswordChangedMessage,
};
use domain::{CategoryEvent, EventPublisher, UserEvent};
use event_store::EventEnvelope;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("failed to decode event: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{event_type} event does not match its payload")]
    UnexpectedPayload { event_type: String },

    #[error("aggregate id {0} has the wrong kind")]
    AggregateId(String),
}

type Translator = fn(&EventEnvelope) -> Result<MessageEnvelope, TranslateError>;

/// Publishes a message for every event with a registered translator.
///
/// Sending never blocks. Events without a translator are skipped.
pub struct MessageProducer {
    sender: mpsc::UnboundedSender<MessageEnvelope>,
    translators: HashMap<&'static str, Translator>,
}

impl MessageProducer {
    pub fn new(sender: mpsc::UnboundedSender<MessageEnvelope>) -> Self {
        let translators: [(&'static str, Translator); 6] = [
            ("UserCreated", user_created),
            ("UserEmailVerified", user_email_verified),
            ("UserPasswordChanged", user_password_changed),
            ("CategoryCreated", category_created),
            ("CategoryMarkedForDeletion", category_marked_for_deletion),
            ("CategoryDeleted", category_deleted),
        ];
        Self {
            sender,
            translators: translators.into_iter().collect(),
        }
    }

    /// Creates a producer together with the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MessageEnvelope>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    /// Translates one event, or returns `None` if nothing is published for it.
    pub fn translate(
        &self,
        event: &EventEnvelope,
    ) -> Option<Result<MessageEnvelope, TranslateError>> {
        self.translators
            .get(event.event_type.as_str())
            .map(|translate| translate(event))
    }
}

impl EventPublisher for MessageProducer {
    fn publish(&self, events: &[EventEnvelope]) {
        for event in events {
            let message = match self.translate(event) {
                None => {
                    tracing::debug!(event_type = %event.event_type, "no message for event");
                    continue;
                }
                Some(Err(error)) => {
                    tracing::error!(
                        %error,
                        event_type = %event.event_type,
                        aggregate_id = %event.aggregate_id,
                        "failed to translate event"
                    );
                    continue;
                }
                Some(Ok(message)) => message,
            };

            let message_type = message.message_type.clone();
            if self.sender.send(message).is_err() {
                tracing::warn!(%message_type, "read side is gone, message dropped");
                continue;
            }
            metrics::counter!("messages_published_total", "type" => message_type).increment(1);
        }
    }
}

/// Wraps a message stamped with the version of the event it came from.
fn wrap<M: AuctionMessage>(
    event: &EventEnvelope,
    message: M,
) -> Result<MessageEnvelope, TranslateError> {
    Ok(MessageEnvelope::wrap(&message, event.version.as_i64())?)
}

fn unexpected(event: &EventEnvelope) -> TranslateError {
    TranslateError::UnexpectedPayload {
        event_type: event.event_type.clone(),
    }
}

fn user_id(event: &EventEnvelope) -> Result<uuid::Uuid, TranslateError> {
    event
        .aggregate_id
        .as_uuid()
        .ok_or_else(|| TranslateError::AggregateId(event.aggregate_id.to_string()))
}

fn category_id(event: &EventEnvelope) -> Result<i64, TranslateError> {
    event
        .aggregate_id
        .as_long()
        .ok_or_else(|| TranslateError::AggregateId(event.aggregate_id.to_string()))
}

fn user_created(event: &EventEnvelope) -> Result<MessageEnvelope, TranslateError> {
    let UserEvent::UserCreated(data) = event.decode::<UserEvent>()? else {
        return Err(unexpected(event));
    };
    wrap(event, UserCreatedMessage {
        user_id: data.user_id,
        user_name: data.user_name.as_str().to_string(),
        email: data.email.as_str().to_string(),
        password_hash: data.password_hash.as_str().to_string(),
    })
}

fn user_email_verified(event: &EventEnvelope) -> Result<MessageEnvelope, TranslateError> {
    wrap(event, UserEmailVerifiedMessage {
        user_id: user_id(event)?,
    })
}

fn user_password_changed(event: &EventEnvelope) -> Result<MessageEnvelope, TranslateError> {
    let UserEvent::UserPasswordChanged(data) = event.decode::<UserEvent>()? else {
        return Err(unexpected(event));
    };
    wrap(event, UserPasswordChangedMessage {
        user_id: user_id(event)?,
        password_hash: data.new_password_hash.as_str().to_string(),
    })
}

fn category_created(event: &EventEnvelope) -> Result<MessageEnvelope, TranslateError> {
    let CategoryEvent::CategoryCreated(data) = event.decode::<CategoryEvent>()? else {
        return Err(unexpected(event));
    };
    wrap(event, CategoryCreatedMessage {
        category_id: data.category_id,
        name: data.name.as_str().to_string(),
    })
}

fn category_marked_for_deletion(event: &EventEnvelope) -> Result<MessageEnvelope, TranslateError> {
    wrap(event, CategoryMarkedForDeletionMessage {
        category_id: category_id(event)?,
    })
}

fn category_deleted(event: &EventEnvelope) -> Result<MessageEnvelope, TranslateError> {
    wrap(event, CategoryDeletedMessage {
        category_id: category_id(event)?,
    })
}
