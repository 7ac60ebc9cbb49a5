use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{NameMatch, RecordStore, StoreError, StudentRoster};
use crate::records::{Feedback, House, RecordFields, Stored};

/// Process-local store used by tests and `STORE=memory` runs.
///
/// Records are kept in insertion order, so reversing gives newest first
/// even when two records share a millisecond timestamp.
pub struct MemoryStore<F> {
    records: RwLock<Vec<Stored<F>>>,
}

impl<F> MemoryStore<F> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<F> Default for MemoryStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<F: RecordFields> RecordStore<F> for MemoryStore<F> {
    async fn create(&self, fields: F) -> Result<Stored<F>, StoreError> {
        let stored = Stored::new(fields);
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Stored<F>>, StoreError> {
        let records = self.records.read().await;
        let mut listing: Vec<_> = records.iter().rev().cloned().collect();
        // Stable sort keeps reverse-insertion order among equal timestamps
        listing.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(listing)
    }

    async fn update_by_id(&self, id: Uuid, fields: F) -> Result<Stored<F>, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(F::LABEL))?;
        record.fields = fields;
        Ok(record.clone())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Stored<F>, StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::NotFound(F::LABEL))?;
        Ok(records.remove(index))
    }
}

#[async_trait]
impl StudentRoster for MemoryStore<Feedback> {
    async fn remove_students(
        &self,
        house: House,
        name: &str,
        mode: NameMatch,
    ) -> Result<u64, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.fields.house == house && mode.matches(&r.fields.student_name, name)));
        Ok((before - records.len()) as u64)
    }
}
