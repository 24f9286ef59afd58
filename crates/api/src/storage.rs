//! Backing stores for the uniqueness constraints and category ids.

use std::sync::Arc;

use domain::{
    ConstraintSet, IdSequence, InMemoryConstraintSet, InMemoryIdSequence, PostgresConstraintSet,
    PostgresIdSequence,
};
use sqlx::PgPool;

/// Constraint namespace of user name/email pairs.
pub const USER_NAMESPACE: &str = "user";

/// Constraint namespace of category names.
pub const CATEGORY_NAMESPACE: &str = "category";

/// The shared stores the command handler needs besides the event store.
#[derive(Clone)]
pub struct Storage {
    pub user_constraints: Arc<dyn ConstraintSet>,
    pub category_constraints: Arc<dyn ConstraintSet>,
    pub category_ids: Arc<dyn IdSequence>,
}

impl Storage {
    /// Process-local stores. Their contents are lost on restart.
    pub fn in_memory() -> Self {
        Self {
            user_constraints: Arc::new(InMemoryConstraintSet::new()),
            category_constraints: Arc::new(InMemoryConstraintSet::new()),
            category_ids: Arc::new(InMemoryIdSequence::new()),
        }
    }

    /// PostgreSQL-backed stores. Applies pending migrations first.
    pub async fn postgres(pool: PgPool) -> Result<Self, sqlx::migrate::MigrateError> {
        PostgresConstraintSet::run_migrations(&pool).await?;
        Ok(Self {
            user_constraints: Arc::new(PostgresConstraintSet::new(pool.clone(), USER_NAMESPACE)),
            category_constraints: Arc::new(PostgresConstraintSet::new(
                pool.clone(),
                CATEGORY_NAMESPACE,
            )),
            category_ids: Arc::new(PostgresIdSequence::new(
                pool,
                PostgresIdSequence::CATEGORY_SEQUENCE,
            )),
        })
    }
}
