//! Verification mail for newly registered users.

use domain::{EventPublisher, UserEvent};
use event_store::EventEnvelope;

/// Sends the email verification notice when a user is created.
///
/// There is no mail transport; the notice is written to the log.
#[derive(Debug, Clone, Default)]
pub struct VerificationMailer {
    sender: String,
}

impl VerificationMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    /// Renders the notice for a `UserCreated` event.
    pub fn compose(&self, event: &EventEnvelope) -> Option<VerificationMail> {
        if event.event_type != "UserCreated" {
            return None;
        }
        match event.decode::<UserEvent>() {
            Ok(UserEvent::UserCreated(data)) => Some(VerificationMail {
                from: self.sender.clone(),
                to: data.email.as_str().to_string(),
                subject: "Please verify your email address".to_string(),
                body: format!(
                    "Hello {}, confirm your registration with user id {} and token {}",
                    data.user_name, data.user_id, data.verification_token
                ),
            }),
            Ok(_) => None,
            Err(error) => {
                tracing::error!(%error, aggregate_id = %event.aggregate_id, "undecodable UserCreated event");
                None
            }
        }
    }
}

/// A composed verification mail. The body carries the live token.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl std::fmt::Debug for VerificationMail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationMail")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("subject", &self.subject)
            .field("body", &"<redacted>")
            .finish()
    }
}

impl EventPublisher for VerificationMailer {
    fn publish(&self, events: &[EventEnvelope]) {
        for mail in events.iter().filter_map(|event| self.compose(event)) {
            tracing::info!(
                from = %mail.from,
                to = %mail.to,
                subject = %mail.subject,
                "verification mail composed"
            );
            tracing::debug!(to = %mail.to, body = %mail.body, "verification mail body");
        }
    }
}
