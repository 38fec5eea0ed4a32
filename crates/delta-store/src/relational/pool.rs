use crate::config::RelationalConfig;
use crate::error::StoreError;
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::AnyPool;

/// Connects a backend-agnostic pool. `sqlx::Any` needs its concrete driver
/// set registered once per process before the first connection.
pub async fn connect(config: &RelationalConfig) -> Result<AnyPool, StoreError> {
    install_default_drivers();
    let url = config.to_url()?;
    // An in-memory SQLite database lives only as long as its one connection
    // stays open; pooling more than one would silently scatter tables
    // across unrelated databases.
    let max_connections = if matches!(config.kind, crate::config::RelationalKind::Sqlite)
        && config.filename.as_deref().unwrap_or(":memory:") == ":memory:"
    {
        1
    } else {
        5
    };
    let pool = AnyPoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;
    Ok(pool)
}

/// Table names are namespaced per client and sanitized to the characters
/// every supported dialect accepts unquoted.
pub fn table_name(client_id: &str, which: &str) -> String {
    let sanitized: String = client_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("client_{sanitized}_{which}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_non_alphanumeric_client_ids() {
        assert_eq!(table_name("acme/corp 1", "current"), "client_acme_corp_1_current");
    }
}
