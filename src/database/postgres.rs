use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::marker::PhantomData;
use tracing::info;
use uuid::Uuid;

use super::store::{NameMatch, RecordStore, StoreError, StudentRoster};
use crate::records::{Feedback, House, RecordFields, Stored};

/// JSONB document store, one table per record type.
///
/// Table layout: `id UUID`, insertion `seq`, `"timestamp"`, and the
/// validated fields as `doc JSONB`. Every write is a single statement.
pub struct PgStore<F> {
    pool: PgPool,
    table: String,
    _phantom: PhantomData<fn() -> F>,
}

impl<F: RecordFields> PgStore<F> {
    pub fn new(pool: PgPool) -> Self {
        Self::in_table(pool, F::COLLECTION)
    }

    /// Store backed by a table other than the collection default
    pub fn in_table(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
            _phantom: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Create the collection table and its listing index if missing
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        let table = &self.table;
        sqlx::query(&format!(
            r#"CREATE TABLE IF NOT EXISTS "{table}" (
                id UUID PRIMARY KEY,
                seq BIGSERIAL NOT NULL,
                "timestamp" TIMESTAMPTZ NOT NULL,
                doc JSONB NOT NULL
            )"#
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            r#"CREATE INDEX IF NOT EXISTS "{table}_newest_idx" ON "{table}" ("timestamp" DESC, seq DESC)"#
        ))
        .execute(&self.pool)
        .await?;

        info!("Collection ready: {}", table);
        Ok(())
    }

    fn decode(row: &PgRow) -> Result<Stored<F>, StoreError> {
        let id: Uuid = row.try_get("id")?;
        let timestamp: DateTime<Utc> = row.try_get("timestamp")?;
        let doc: Value = row.try_get("doc")?;
        let fields = serde_json::from_value(doc).map_err(|source| StoreError::Corrupt { id, source })?;
        Ok(Stored { id, fields, timestamp })
    }
}

#[async_trait]
impl<F: RecordFields> RecordStore<F> for PgStore<F> {
    async fn create(&self, fields: F) -> Result<Stored<F>, StoreError> {
        let stored = Stored::new(fields);
        let doc = serde_json::to_value(&stored.fields)?;

        sqlx::query(&format!(
            r#"INSERT INTO "{}" (id, "timestamp", doc) VALUES ($1, $2, $3)"#,
            self.table
        ))
        .bind(stored.id)
        .bind(stored.timestamp)
        .bind(doc)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Stored<F>>, StoreError> {
        let rows = sqlx::query(&format!(
            r#"SELECT id, "timestamp", doc FROM "{}" ORDER BY "timestamp" DESC, seq DESC"#,
            self.table
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::decode).collect()
    }

    async fn update_by_id(&self, id: Uuid, fields: F) -> Result<Stored<F>, StoreError> {
        let doc = serde_json::to_value(&fields)?;

        let row = sqlx::query(&format!(
            r#"UPDATE "{}" SET doc = $2 WHERE id = $1 RETURNING id, "timestamp", doc"#,
            self.table
        ))
        .bind(id)
        .bind(doc)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::decode(&row),
            None => Err(StoreError::NotFound(F::LABEL)),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Stored<F>, StoreError> {
        let row = sqlx::query(&format!(
            r#"DELETE FROM "{}" WHERE id = $1 RETURNING id, "timestamp", doc"#,
            self.table
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::decode(&row),
            None => Err(StoreError::NotFound(F::LABEL)),
        }
    }

    async fn insert_many(&self, batch: Vec<F>) -> Result<Vec<Stored<F>>, StoreError> {
        let sql = format!(
            r#"INSERT INTO "{}" (id, "timestamp", doc) VALUES ($1, $2, $3)"#,
            self.table
        );

        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(batch.len());
        for fields in batch {
            let record = Stored::new(fields);
            sqlx::query(&sql)
                .bind(record.id)
                .bind(record.timestamp)
                .bind(serde_json::to_value(&record.fields)?)
                .execute(&mut *tx)
                .await?;
            stored.push(record);
        }
        tx.commit().await?;

        Ok(stored)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl StudentRoster for PgStore<Feedback> {
    async fn remove_students(
        &self,
        house: House,
        name: &str,
        mode: NameMatch,
    ) -> Result<u64, StoreError> {
        let predicate = match mode {
            NameMatch::Exact => "lower(doc->>'studentName') = lower($2)",
            NameMatch::Prefix => "starts_with(lower(doc->>'studentName'), lower($2))",
        };

        let result = sqlx::query(&format!(
            r#"DELETE FROM "{}" WHERE doc->>'house' = $1 AND {}"#,
            self.table,
            predicate
        ))
        .bind(house.as_str())
        .bind(name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
