//! Loading and persisting event-sourced aggregates.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use common::AggregateId;
use event_store::{AppendOptions, EventEnvelope, EventStore, Version};
use tokio::sync::Mutex;

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;
use crate::publisher::{EventPublisher, NoopPublisher};

/// Default number of reload-and-retry rounds after a version conflict.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Lock stripes ordering append-then-publish. Aggregates sharing a stripe
/// commit one after another.
const COMMIT_STRIPES: usize = 64;

/// An event that was appended, with the aggregate state after applying it.
#[derive(Debug)]
pub struct Committed<A: Aggregate> {
    pub aggregate: A,
    pub event: A::Event,
    pub version: Version,
}

/// Repository for one aggregate type.
///
/// Each command runs against freshly replayed state. The resulting event is
/// appended with the version the state was loaded at, so a concurrent writer
/// on the same aggregate causes a conflict instead of a lost update. On
/// conflict the aggregate is reloaded and the command re-run, which re-checks
/// its preconditions against the newer state.
///
/// Appending and publishing happen under a per-aggregate lock, so the
/// publisher sees each aggregate's events in version order.
pub struct Repository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    store: S,
    publisher: Arc<dyn EventPublisher>,
    max_retries: usize,
    commit_locks: Vec<Mutex<()>>,
    _phantom: PhantomData<A>,
}

impl<S, A> Repository<S, A>
where
    S: EventStore,
    A: Aggregate,
{
    pub fn new(store: S, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            publisher,
            max_retries: DEFAULT_MAX_RETRIES,
            commit_locks: (0..COMMIT_STRIPES).map(|_| Mutex::new(())).collect(),
            _phantom: PhantomData,
        }
    }

    /// Creates a repository that publishes nowhere.
    pub fn unpublished(store: S) -> Self {
        Self::new(store, Arc::new(NoopPublisher))
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads an aggregate by replaying its events.
    ///
    /// An unknown id yields the default (uninitialized) aggregate.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<A, DomainError> {
        let envelopes = self.store.get_events_for_aggregate(aggregate_id).await?;
        let stored_version = envelopes.last().map(|e| e.version);

        let events = envelopes
            .iter()
            .map(|envelope| envelope.decode::<A::Event>())
            .collect::<Result<Vec<_>, _>>()?;

        let mut aggregate = A::replay(events);
        if let Some(version) = stored_version {
            aggregate.set_version(version);
        }
        Ok(aggregate)
    }

    /// Loads an aggregate, returning None if it doesn't exist.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError> {
        let aggregate = self.load(aggregate_id).await?;
        Ok(aggregate.id().is_some().then_some(aggregate))
    }

    /// Runs a creation command against a new aggregate id.
    ///
    /// The append expects no prior events, so an id that is already taken
    /// fails instead of extending someone else's history.
    pub async fn create<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<Committed<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<A::Event, A::Error>,
        DomainError: From<A::Error>,
    {
        let aggregate = self.load(aggregate_id).await?;
        let event = command_fn(&aggregate)?;
        self.commit(aggregate_id, aggregate, event).await
    }

    /// Runs a command against an existing aggregate.
    ///
    /// Fails with `AggregateNotFound` if the aggregate has no events.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<Committed<A>, DomainError>
    where
        F: Fn(&A) -> Result<A::Event, A::Error>,
        DomainError: From<A::Error>,
    {
        let mut attempt = 0;
        loop {
            let aggregate = self.load_existing(aggregate_id).await?.ok_or_else(|| {
                DomainError::AggregateNotFound {
                    aggregate_type: A::aggregate_type(),
                    aggregate_id: aggregate_id.to_string(),
                }
            })?;
            let event = command_fn(&aggregate)?;

            match self.commit(aggregate_id, aggregate, event).await {
                Err(DomainError::EventStore(e)) if e.is_conflict() => {
                    if attempt >= self.max_retries {
                        return Err(DomainError::ConcurrencyRetriesExhausted {
                            aggregate_id: aggregate_id.to_string(),
                            attempts: attempt + 1,
                        });
                    }
                    attempt += 1;
                    metrics::counter!(
                        "aggregate_concurrency_retries_total",
                        "aggregate_type" => A::aggregate_type()
                    )
                    .increment(1);
                    tracing::debug!(%aggregate_id, attempt, "version conflict, reloading aggregate");
                }
                result => return result,
            }
        }
    }

    fn commit_lock(&self, aggregate_id: AggregateId) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        aggregate_id.hash(&mut hasher);
        let stripe = hasher.finish() as usize % self.commit_locks.len();
        &self.commit_locks[stripe]
    }

    async fn commit(
        &self,
        aggregate_id: AggregateId,
        mut aggregate: A,
        event: A::Event,
    ) -> Result<Committed<A>, DomainError> {
        let expected = aggregate.version();
        let envelope = EventEnvelope::record(
            aggregate_id,
            A::aggregate_type(),
            event.event_type(),
            expected.next(),
            &event,
        )?;

        let _ordered = self.commit_lock(aggregate_id).lock().await;
        let version = self
            .store
            .append(vec![envelope.clone()], AppendOptions::expect_version(expected))
            .await?;

        aggregate.apply(event.clone());
        aggregate.set_version(version);
        self.publisher.publish(std::slice::from_ref(&envelope));

        Ok(Committed {
            aggregate,
            event,
            version,
        })
    }
}
