//! Event storage for the auction command side.
//!
//! Events are kept per aggregate in version order. Appends carry an expected
//! version so concurrent writers to the same aggregate are detected instead
//! of silently interleaved.

pub mod error;
pub mod event;
pub mod memory;
pub mod store;

pub use common::AggregateId;
pub use error::{EventStoreError, Result};
pub use event::{EventEnvelope, Version};
pub use memory::InMemoryEventStore;
pub use store::{AppendOptions, EventStore};
