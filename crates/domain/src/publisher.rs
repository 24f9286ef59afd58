//! Hand-off point between the command side and downstream consumers.

use std::sync::Arc;

use event_store::EventEnvelope;

/// Receives events after they have been durably appended.
///
/// Publishing must not block and must not fail the command: the events are
/// already stored, so delivery problems are the publisher's to log.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, events: &[EventEnvelope]);
}

/// Publisher that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _events: &[EventEnvelope]) {}
}

/// Forwards every batch to each inner publisher in order.
#[derive(Clone, Default)]
pub struct FanOutPublisher {
    publishers: Vec<Arc<dyn EventPublisher>>,
}

impl FanOutPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publishers.push(publisher);
        self
    }
}

impl EventPublisher for FanOutPublisher {
    fn publish(&self, events: &[EventEnvelope]) {
        for publisher in &self.publishers {
            publisher.publish(events);
        }
    }
}
