//! Uniqueness guard over (identity, secondary) key pairs.
//!
//! A constraint set admits at most one entry per identity key and at most one
//! per secondary key. `add` checks both and inserts in a single atomic step,
//! so two concurrent registrations can never both claim the same key.

mod memory;
mod postgres;

pub use memory::InMemoryConstraintSet;
pub use postgres::PostgresConstraintSet;

use async_trait::async_trait;
use thiserror::Error;

/// Why an `add` was refused.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// The exact identity/secondary pair is already registered.
    #[error("Combination of '{identity}' and {secondary:?} already exists")]
    CombinationAlreadyExists {
        identity: String,
        secondary: Option<String>,
    },

    /// The identity is registered with a different secondary key.
    #[error("Identity '{0}' already exists")]
    IdentityAlreadyExists(String),

    /// The secondary key is registered under a different identity.
    #[error("Secondary key '{0}' already exists")]
    SecondaryAlreadyExists(String),

    #[error("Constraint storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[async_trait]
pub trait ConstraintSet: Send + Sync {
    /// Registers a pair, or reports which key is taken.
    ///
    /// Precedence when several conditions hold: combination, then identity,
    /// then secondary.
    async fn add(&self, identity: &str, secondary: Option<&str>) -> Result<(), ConstraintError>;

    /// Removes the entry for `identity`, freeing its secondary key too.
    ///
    /// Returns false if there was nothing to remove.
    async fn remove(&self, identity: &str) -> Result<bool, ConstraintError>;
}

/// Classifies a refused pair against the entries that collide with it.
///
/// `existing` holds the (identity, secondary) rows that share either key.
pub(crate) fn classify_conflict<'a>(
    identity: &str,
    secondary: Option<&str>,
    existing: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Option<ConstraintError> {
    let mut identity_taken = false;
    let mut secondary_taken = false;

    for (existing_identity, existing_secondary) in existing {
        if existing_identity == identity {
            if existing_secondary == secondary {
                return Some(ConstraintError::CombinationAlreadyExists {
                    identity: identity.to_string(),
                    secondary: secondary.map(str::to_string),
                });
            }
            identity_taken = true;
        } else if secondary.is_some() && existing_secondary == secondary {
            secondary_taken = true;
        }
    }

    if identity_taken {
        Some(ConstraintError::IdentityAlreadyExists(identity.to_string()))
    } else if secondary_taken {
        Some(ConstraintError::SecondaryAlreadyExists(
            secondary.unwrap_or_default().to_string(),
        ))
    } else {
        None
    }
}
