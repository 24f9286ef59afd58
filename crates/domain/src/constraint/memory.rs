use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{ConstraintError, ConstraintSet, classify_conflict};

#[derive(Debug, Default)]
struct Entries {
    by_identity: HashMap<String, Option<String>>,
    by_secondary: HashMap<String, String>,
}

/// Constraint set held in process memory.
///
/// One mutex covers both maps, so check and insert happen together.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConstraintSet {
    entries: Arc<Mutex<Entries>>,
}

impl InMemoryConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.by_identity.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ConstraintSet for InMemoryConstraintSet {
    async fn add(&self, identity: &str, secondary: Option<&str>) -> Result<(), ConstraintError> {
        let mut entries = self.entries.lock().await;

        let by_identity = entries
            .by_identity
            .get_key_value(identity)
            .map(|(i, s)| (i.as_str(), s.as_deref()));
        let by_secondary = secondary.and_then(|s| {
            entries
                .by_secondary
                .get_key_value(s)
                .map(|(s, i)| (i.as_str(), Some(s.as_str())))
        });

        let colliding = by_identity.into_iter().chain(by_secondary);
        if let Some(conflict) = classify_conflict(identity, secondary, colliding) {
            return Err(conflict);
        }

        entries
            .by_identity
            .insert(identity.to_string(), secondary.map(str::to_string));
        if let Some(secondary) = secondary {
            entries
                .by_secondary
                .insert(secondary.to_string(), identity.to_string());
        }
        Ok(())
    }

    async fn remove(&self, identity: &str) -> Result<bool, ConstraintError> {
        let mut entries = self.entries.lock().await;
        let Some(secondary) = entries.by_identity.remove(identity) else {
            return Ok(false);
        };
        if let Some(secondary) = secondary {
            entries.by_secondary.remove(&secondary);
        }
        Ok(true)
    }
}
