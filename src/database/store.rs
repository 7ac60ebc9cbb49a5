use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::records::{Feedback, House, RecordFields, Stored};

/// Errors surfaced by record stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Corrupt document {id}: {source}")]
    Corrupt {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Persistence for one record type
#[async_trait]
pub trait RecordStore<F: RecordFields>: Send + Sync {
    /// Persist a validated record, assigning id and timestamp
    async fn create(&self, fields: F) -> Result<Stored<F>, StoreError>;

    /// Every record, newest first
    async fn list_all(&self) -> Result<Vec<Stored<F>>, StoreError>;

    /// Replace the fields of an existing record; never inserts
    async fn update_by_id(&self, id: Uuid, fields: F) -> Result<Stored<F>, StoreError>;

    /// Remove and return a record
    async fn delete_by_id(&self, id: Uuid) -> Result<Stored<F>, StoreError>;

    /// Batch create, in order
    async fn insert_many(&self, batch: Vec<F>) -> Result<Vec<Stored<F>>, StoreError> {
        let mut stored = Vec::with_capacity(batch.len());
        for fields in batch {
            stored.push(self.create(fields).await?);
        }
        Ok(stored)
    }

    /// Connectivity probe
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// How a student name selects feedback for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatch {
    /// Whole name, case-insensitive
    #[default]
    Exact,
    /// Name starts with the given text, case-insensitive
    Prefix,
}

impl NameMatch {
    pub fn matches(&self, candidate: &str, wanted: &str) -> bool {
        let candidate = candidate.to_lowercase();
        let wanted = wanted.to_lowercase();
        match self {
            NameMatch::Exact => candidate == wanted,
            NameMatch::Prefix => candidate.starts_with(&wanted),
        }
    }
}

/// Bulk removal of a house's feedback by student name
#[async_trait]
pub trait StudentRoster: RecordStore<Feedback> {
    /// Delete matching feedback in `house`; returns the number removed
    async fn remove_students(
        &self,
        house: House,
        name: &str,
        mode: NameMatch,
    ) -> Result<u64, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_ignores_case_only() {
        assert!(NameMatch::Exact.matches("Ravinder Kaur", "ravinder kaur"));
        assert!(!NameMatch::Exact.matches("Ravinder Kaur", "Ravinder"));
    }

    #[test]
    fn prefix_match_covers_surnames() {
        assert!(NameMatch::Prefix.matches("Ravinder Kaur", "ravinder"));
        assert!(NameMatch::Prefix.matches("Jannatveer Kaur", "Jannatveer"));
        assert!(!NameMatch::Prefix.matches("Sunaina", "Nain"));
    }
}
