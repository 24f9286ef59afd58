//! Sources of numeric aggregate identifiers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdSequenceError {
    #[error("Id sequence storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Hands out strictly increasing identifiers, never the same one twice.
#[async_trait]
pub trait IdSequence: Send + Sync {
    async fn next_id(&self) -> Result<i64, IdSequenceError>;
}

/// Process-local sequence starting at 1.
#[derive(Debug, Clone)]
pub struct InMemoryIdSequence {
    next: Arc<AtomicI64>,
}

impl InMemoryIdSequence {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: i64) -> Self {
        Self {
            next: Arc::new(AtomicI64::new(first)),
        }
    }
}

impl Default for InMemoryIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdSequence for InMemoryIdSequence {
    async fn next_id(&self) -> Result<i64, IdSequenceError> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

/// Sequence backed by a PostgreSQL `SEQUENCE`.
#[derive(Debug, Clone)]
pub struct PostgresIdSequence {
    pool: PgPool,
    sequence: String,
}

impl PostgresIdSequence {
    /// The sequence created by the bundled migration.
    pub const CATEGORY_SEQUENCE: &'static str = "category_id_seq";

    pub fn new(pool: PgPool, sequence: impl Into<String>) -> Self {
        Self {
            pool,
            sequence: sequence.into(),
        }
    }
}

#[async_trait]
impl IdSequence for PostgresIdSequence {
    async fn next_id(&self) -> Result<i64, IdSequenceError> {
        let id: i64 = sqlx::query_scalar("SELECT nextval($1::text::regclass)")
            .bind(&self.sequence)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }
}
