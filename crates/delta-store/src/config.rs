use serde::{Deserialize, Serialize};

/// Which `BaselineStore` backend to construct, and how to reach it (spec
/// §4.5's three backend kinds plus the connection details each needs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BaselineStoreConfig {
    #[serde(rename_all = "camelCase")]
    Filesystem { root: String },

    #[serde(rename_all = "camelCase")]
    ObjectBucket {
        bucket_name: String,
        #[serde(default = "default_key_prefix")]
        key_prefix: String,
        region: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    Relational(RelationalConfig),
}

fn default_key_prefix() -> String {
    "delta-sync".to_string()
}

/// Connection parameters for the relational backend. `kind` selects the
/// wire dialect; the rest assemble into a single URL handed to
/// `sqlx::AnyPool`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationalConfig {
    pub kind: RelationalKind,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// SQLite only: path to the database file (`:memory:` for an ephemeral
    /// in-process database, handy in tests).
    pub filename: Option<String>,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationalKind {
    Sqlite,
    Postgresql,
    Mysql,
}

impl RelationalConfig {
    pub fn to_url(&self) -> Result<String, crate::error::StoreError> {
        match self.kind {
            RelationalKind::Sqlite => {
                let file = self.filename.as_deref().unwrap_or(":memory:");
                Ok(format!("sqlite://{file}"))
            }
            RelationalKind::Postgresql | RelationalKind::Mysql => {
                let scheme = match self.kind {
                    RelationalKind::Postgresql => "postgres",
                    RelationalKind::Mysql => "mysql",
                    RelationalKind::Sqlite => unreachable!(),
                };
                let host = self.host.as_deref().unwrap_or("localhost");
                let port = self
                    .port
                    .unwrap_or(if self.kind == RelationalKind::Postgresql {
                        5432
                    } else {
                        3306
                    });
                let user = self.username.as_deref().unwrap_or("");
                let pass = self.password.as_deref().unwrap_or("");
                let db = self.database.as_deref().ok_or_else(|| {
                    crate::error::StoreError::Config(
                        "relational config missing database name".to_string(),
                    )
                })?;
                let auth = if user.is_empty() {
                    String::new()
                } else {
                    format!("{user}:{pass}@")
                };
                let ssl_suffix = if self.ssl { "?sslmode=require" } else { "" };
                Ok(format!("{scheme}://{auth}{host}:{port}/{db}{ssl_suffix}"))
            }
        }
    }
}
