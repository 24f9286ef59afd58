//! Delivers read-side messages to the projections that handle them.

use std::collections::HashMap;
use std::sync::Arc;

use common::MessageEnvelope;
use tokio::sync::mpsc;

use crate::Result;
use crate::projection::Projection;

/// What happened to a dispatched message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Applied by this many projections.
    Applied(usize),
    /// No projection handles the message type.
    Ignored,
}

/// Routing table from message type to projections.
#[derive(Default)]
pub struct MessageListener {
    routes: HashMap<&'static str, Vec<Arc<dyn Projection>>>,
}

impl MessageListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes every message type the projection declares to it.
    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        for &message_type in projection.message_types() {
            self.routes
                .entry(message_type)
                .or_default()
                .push(Arc::clone(&projection));
        }
    }

    pub fn with(mut self, projection: Arc<dyn Projection>) -> Self {
        self.register(projection);
        self
    }

    pub fn handles(&self, message_type: &str) -> bool {
        self.routes.contains_key(message_type)
    }

    /// Applies one message to each projection registered for its type.
    ///
    /// Stops at the first failing projection.
    #[tracing::instrument(
        skip(self, message),
        fields(message_type = %message.message_type, aggregate_id = %message.aggregate_id)
    )]
    pub async fn dispatch(&self, message: &MessageEnvelope) -> Result<Delivery> {
        let Some(projections) = self.routes.get(message.message_type.as_str()) else {
            tracing::warn!("no projection handles this message type, ignoring");
            metrics::counter!("messages_ignored_total").increment(1);
            return Ok(Delivery::Ignored);
        };

        for projection in projections {
            projection.handle(message).await?;
        }
        metrics::counter!("messages_consumed_total", "type" => message.message_type.clone())
            .increment(1);
        Ok(Delivery::Applied(projections.len()))
    }

    /// Consumes messages until every sender is dropped.
    ///
    /// Messages are applied one at a time in arrival order. A failing message
    /// is logged and skipped.
    pub async fn run(self, mut receiver: mpsc::UnboundedReceiver<MessageEnvelope>) {
        tracing::info!(message_types = self.routes.len(), "read model listener started");

        while let Some(message) = receiver.recv().await {
            if let Err(error) = self.dispatch(&message).await {
                tracing::error!(
                    %error,
                    message_type = %message.message_type,
                    message_id = %message.message_id,
                    "failed to apply message"
                );
                metrics::counter!("messages_failed_total").increment(1);
            }
        }

        tracing::info!("read model listener stopped");
    }
}
