use super::pool::table_name;
use super::schema::{ensure_client_tables, ensure_history_table, history_table};
use crate::error::StoreError;
use crate::traits::{BaselineStore, HistoryRow, RelationalBaselineStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use delta_engine::{relational as diff_sql, DeltaResult};
use delta_model::{Field, FieldSet};
use sqlx::{AnyPool, Row};
use std::collections::HashSet;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;

/// The RelationalDiff backend (spec §4.4/§4.5): `current`/`previous` live
/// as tables, the delta is a server-side join, and every `fetch_delta` call
/// appends a row to `delta_history` (spec C9).
pub struct RelationalStore {
    pool: AnyPool,
    initialized: RwLock<HashSet<String>>,
}

impl RelationalStore {
    pub fn new(pool: AnyPool) -> Self {
        RelationalStore {
            pool,
            initialized: RwLock::new(HashSet::new()),
        }
    }

    async fn require_initialized(&self, client_id: &str) -> Result<(), StoreError> {
        if self.initialized.read().await.contains(client_id) {
            Ok(())
        } else {
            Err(StoreError::NotInitialized {
                client_id: client_id.to_string(),
            })
        }
    }

    /// Reconstructs pk-only field sets from a `pk` column built by joining
    /// `pk_values` with `|` (spec §4.5). This is lossy: every reconstructed
    /// value comes back as a string, regardless of its original type, since
    /// the join only ever sees the display form (spec §9 open question b).
    fn split_pk(pk: &str, hash: &str, pk_fields: &[String]) -> FieldSet {
        let parts: Vec<&str> = pk.split('|').collect();
        let fields = pk_fields
            .iter()
            .enumerate()
            .map(|(i, name)| Field::new(name.clone(), parts.get(i).copied().unwrap_or("")))
            .collect();
        let mut record = FieldSet::new(fields);
        record.hash = Some(hash.to_string());
        record
    }
}

#[async_trait]
impl BaselineStore for RelationalStore {
    #[instrument(skip(self, pk_fields), fields(client_id))]
    async fn initialize(&self, client_id: &str, pk_fields: &[String]) -> Result<(), StoreError> {
        if pk_fields.is_empty() {
            return Err(StoreError::Config(
                "relational backend requires at least one pkFields entry".to_string(),
            ));
        }
        ensure_history_table(&self.pool).await?;
        ensure_client_tables(&self.pool, client_id).await?;
        self.initialized.write().await.insert(client_id.to_string());
        Ok(())
    }

    #[instrument(skip(self, limit_to, pk_fields), fields(client_id))]
    async fn fetch_previous(
        &self,
        client_id: &str,
        pk_fields: &[String],
        limit_to: Option<&[FieldSet]>,
    ) -> Result<Vec<FieldSet>, StoreError> {
        self.require_initialized(client_id).await?;
        let table = table_name(client_id, "previous");
        let rows = sqlx::query(&format!("SELECT pk, hash FROM {table}"))
            .fetch_all(&self.pool)
            .await?;

        let wanted: Option<HashSet<String>> = limit_to
            .map(|records| records.iter().map(|r| r.pk_joined(pk_fields)).collect());

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let pk: String = row.try_get("pk").ok()?;
                let hash: String = row.try_get("hash").ok()?;
                if let Some(wanted) = &wanted {
                    if !wanted.contains(&pk) {
                        return None;
                    }
                }
                Some(Self::split_pk(&pk, &hash, pk_fields))
            })
            .collect())
    }

    /// failure_count == 0: promotes `current` to `previous` verbatim,
    /// ignoring `data` (it already reflects what's in `current`).
    /// failure_count > 0: `data` is the repaired projection and replaces
    /// both tables, since a reverted baseline must also stop being "current"
    /// on the next cycle's diff (spec §4.8).
    #[instrument(skip(self, data, pk_fields), fields(client_id, failure_count))]
    async fn update_previous(
        &self,
        client_id: &str,
        data: Vec<FieldSet>,
        pk_fields: &[String],
        failure_count: usize,
    ) -> Result<usize, StoreError> {
        self.require_initialized(client_id).await?;
        let current = table_name(client_id, "current");
        let previous = table_name(client_id, "previous");
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {previous}")).execute(&mut *tx).await?;

        let written = if failure_count == 0 {
            sqlx::query(&format!(
                "INSERT INTO {previous} (pk, hash, created_at) SELECT pk, hash, created_at FROM {current}"
            ))
            .execute(&mut *tx)
            .await?
            .rows_affected() as usize
        } else {
            sqlx::query(&format!("DELETE FROM {current}")).execute(&mut *tx).await?;
            let mut written = 0usize;
            for record in &data {
                let Some(hash) = &record.hash else { continue };
                let pk = record.pk_joined(pk_fields);
                sqlx::query(&format!(
                    "INSERT INTO {previous} (pk, hash, created_at) VALUES (?, ?, ?)"
                ))
                .bind(&pk)
                .bind(hash)
                .bind(now.to_rfc3339())
                .execute(&mut *tx)
                .await?;
                sqlx::query(&format!(
                    "INSERT INTO {current} (pk, hash, created_at) VALUES (?, ?, ?)"
                ))
                .bind(&pk)
                .bind(hash)
                .bind(now.to_rfc3339())
                .execute(&mut *tx)
                .await?;
                written += 1;
            }
            written
        };

        tx.commit().await?;
        Ok(written)
    }
}

#[async_trait]
impl RelationalBaselineStore for RelationalStore {
    #[instrument(skip(self, data, pk_fields), fields(client_id, count = data.len()))]
    async fn store_current(
        &self,
        client_id: &str,
        data: Vec<FieldSet>,
        pk_fields: &[String],
    ) -> Result<usize, StoreError> {
        self.require_initialized(client_id).await?;
        let current = table_name(client_id, "current");
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DELETE FROM {current}")).execute(&mut *tx).await?;

        let mut written = 0usize;
        for record in &data {
            let Some(hash) = &record.hash else { continue };
            let pk = record.pk_joined(pk_fields);
            sqlx::query(&format!(
                "INSERT INTO {current} (pk, hash, created_at) VALUES (?, ?, ?)"
            ))
            .bind(&pk)
            .bind(hash)
            .bind(now.to_rfc3339())
            .execute(&mut *tx)
            .await?;
            written += 1;
        }
        tx.commit().await?;
        Ok(written)
    }

    #[instrument(skip(self, pk_fields), fields(client_id))]
    async fn fetch_delta(
        &self,
        client_id: &str,
        pk_fields: &[String],
    ) -> Result<DeltaResult, StoreError> {
        self.require_initialized(client_id).await?;
        let current = table_name(client_id, "current");
        let previous = table_name(client_id, "previous");

        let fetch = |sql: String| {
            let pool = self.pool.clone();
            async move { sqlx::query(&sql).fetch_all(&pool).await }
        };

        let added_rows = fetch(diff_sql::added_query(&current, &previous)).await?;
        let updated_rows = fetch(diff_sql::updated_query(&current, &previous)).await?;
        let removed_rows = fetch(diff_sql::removed_query(&current, &previous)).await?;

        let to_records = |rows: Vec<sqlx::any::AnyRow>| -> Result<Vec<FieldSet>, StoreError> {
            rows.into_iter()
                .map(|row| {
                    let pk: String = row.try_get("pk")?;
                    let hash: String = row.try_get("hash")?;
                    Ok(Self::split_pk(&pk, &hash, pk_fields))
                })
                .collect()
        };

        let result = DeltaResult {
            added: to_records(added_rows)?,
            updated: to_records(updated_rows)?,
            removed: to_records(removed_rows)?,
        };

        let (added, updated, removed) = result.counts();
        let metadata = serde_json::json!({ "pkFields": pk_fields });
        sqlx::query(&format!(
            "INSERT INTO {} (id, client_id, added_count, updated_count, removed_count, delta_metadata, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            history_table()
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(client_id)
        .bind(added as i64)
        .bind(updated as i64)
        .bind(removed as i64)
        .bind(metadata.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_history(&self, client_id: &str, limit: usize) -> Result<Vec<HistoryRow>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT id, client_id, added_count, updated_count, removed_count, delta_metadata, created_at \
             FROM {} WHERE client_id = ? ORDER BY created_at DESC LIMIT ?",
            history_table()
        ))
        .bind(client_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let metadata_text: String = row.try_get("delta_metadata")?;
                Ok(HistoryRow {
                    id: row.try_get("id")?,
                    client_id: row.try_get("client_id")?,
                    added_count: row.try_get("added_count")?,
                    updated_count: row.try_get("updated_count")?,
                    removed_count: row.try_get("removed_count")?,
                    metadata: serde_json::from_str(&metadata_text)?,
                    created_at: {
                        let created_at_str: String = row.try_get("created_at")?;
                        DateTime::parse_from_rfc3339(&created_at_str)
                            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
                            .with_timezone(&Utc)
                    },
                })
            })
            .collect()
    }
}
