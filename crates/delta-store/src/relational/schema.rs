use super::pool::table_name;
use crate::error::StoreError;
use sqlx::AnyPool;

const HISTORY_TABLE: &str = "delta_history";

pub async fn ensure_history_table(pool: &AnyPool) -> Result<(), StoreError> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {HISTORY_TABLE} (
            id TEXT PRIMARY KEY,
            client_id VARCHAR(255) NOT NULL,
            added_count INTEGER NOT NULL,
            updated_count INTEGER NOT NULL,
            removed_count INTEGER NOT NULL,
            delta_metadata TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL
        )"
    ))
    .execute(pool)
    .await?;
    Ok(())
}

/// Creates the `current`/`previous` pair for a client. Both hold one row
/// per record, keyed by the record's joined primary key, with a hash
/// column that is all a RelationalDiff join needs to classify a row as
/// added, updated, or removed (spec §4.4).
pub async fn ensure_client_tables(pool: &AnyPool, client_id: &str) -> Result<(), StoreError> {
    for which in ["current", "previous"] {
        let table = table_name(client_id, which);
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                pk VARCHAR(512) PRIMARY KEY,
                hash VARCHAR(128) NOT NULL,
                created_at TIMESTAMP NOT NULL
            )"
        ))
        .execute(pool)
        .await?;
    }
    Ok(())
}

pub fn history_table() -> &'static str {
    HISTORY_TABLE
}
