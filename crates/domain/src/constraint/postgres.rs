use async_trait::async_trait;
use sqlx::PgPool;

use super::{ConstraintError, ConstraintSet, classify_conflict};

/// Constraint set backed by the `constraint_set` table.
///
/// The table's primary key and unique constraint do the concurrency work: an
/// insert that violates either is looked up afterwards to tell which key
/// collided. Several sets share the table, separated by `namespace`.
#[derive(Debug, Clone)]
pub struct PostgresConstraintSet {
    pool: PgPool,
    namespace: String,
}

impl PostgresConstraintSet {
    pub fn new(pool: PgPool, namespace: impl Into<String>) -> Self {
        Self {
            pool,
            namespace: namespace.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(pool).await
    }

    async fn colliding(
        &self,
        identity: &str,
        secondary: Option<&str>,
    ) -> Result<Vec<(String, Option<String>)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT identity_key, secondary_key
            FROM constraint_set
            WHERE namespace = $1 AND (identity_key = $2 OR secondary_key = $3)
            "#,
        )
        .bind(&self.namespace)
        .bind(identity)
        .bind(secondary)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl ConstraintSet for PostgresConstraintSet {
    async fn add(&self, identity: &str, secondary: Option<&str>) -> Result<(), ConstraintError> {
        // A colliding row can disappear between the failed insert and the
        // lookup, in which case the insert is worth one more try.
        for _ in 0..2 {
            let inserted = sqlx::query(
                r#"
                INSERT INTO constraint_set (namespace, identity_key, secondary_key)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(&self.namespace)
            .bind(identity)
            .bind(secondary)
            .execute(&self.pool)
            .await;

            match inserted {
                Ok(_) => return Ok(()),
                Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                    let rows = self.colliding(identity, secondary).await?;
                    let existing = rows.iter().map(|(i, s)| (i.as_str(), s.as_deref()));
                    if let Some(conflict) = classify_conflict(identity, secondary, existing) {
                        return Err(conflict);
                    }
                    tracing::debug!(
                        namespace = %self.namespace,
                        identity,
                        "colliding constraint entry vanished, retrying insert"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ConstraintError::Storage(sqlx::Error::Protocol(format!(
            "unique violation for '{identity}' without a colliding entry"
        ))))
    }

    async fn remove(&self, identity: &str) -> Result<bool, ConstraintError> {
        let result =
            sqlx::query("DELETE FROM constraint_set WHERE namespace = $1 AND identity_key = $2")
                .bind(&self.namespace)
                .bind(identity)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
