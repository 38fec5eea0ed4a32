use clap::Args;
use delta_store::BaselineStoreConfig;
use serde::Deserialize;
use std::path::Path;

/// Layered configuration (spec §4.11): YAML file < `DELTA_*` env vars <
/// CLI flags. `clap`'s `env` feature folds layers 2 and 3 together — every
/// flag that has an environment fallback declares it directly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub client_id: String,
    pub store: BaselineStoreConfig,
    pub pk_fields: Vec<String>,
    pub sort_fields_for_fingerprint: bool,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

/// The file-sourced layer: every field optional, since CLI flags or env
/// vars may fill in what the file omits (or the file may be absent). The
/// store itself deserializes straight into `BaselineStoreConfig`'s own
/// tagged representation, so a relational or object-bucket backend is
/// configured here exactly as it would be anywhere else in the system.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEngineConfig {
    pub client_id: Option<String>,
    pub store: Option<BaselineStoreConfig>,
    pub pk_fields: Option<Vec<String>>,
    pub sort_fields_for_fingerprint: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl RawEngineConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// CLI-flag overrides for `run-cycle`. Each flag that has an environment
/// fallback declares it via `env = "DELTA_..."`, which is how layer 2
/// (env vars) folds into layer 3 (flags) per §4.11.
#[derive(Debug, Args)]
pub struct ConfigOverrides {
    #[arg(long, env = "DELTA_CONFIG_PATH")]
    pub config: Option<std::path::PathBuf>,

    #[arg(long, env = "DELTA_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Shorthand for a filesystem-backed store; ignored when the config
    /// file already names a store of any kind.
    #[arg(long = "store-path", env = "DELTA_STORE_PATH")]
    pub store_path: Option<String>,

    #[arg(long = "log-format", env = "DELTA_LOG_FORMAT")]
    pub log_format: Option<String>,
}

impl EngineConfig {
    pub fn resolve(overrides: &ConfigOverrides) -> anyhow::Result<Self> {
        let mut raw = match &overrides.config {
            Some(path) => RawEngineConfig::from_file(path)?,
            None => RawEngineConfig::default(),
        };

        if let Some(client_id) = &overrides.client_id {
            raw.client_id = Some(client_id.clone());
        }
        if let Some(store_path) = &overrides.store_path {
            raw.store = Some(BaselineStoreConfig::Filesystem {
                root: store_path.clone(),
            });
        }
        if let Some(log_format) = &overrides.log_format {
            raw.log_format = Some(log_format.clone());
        }

        let client_id = raw
            .client_id
            .ok_or_else(|| anyhow::anyhow!("missing required config field: client_id"))?;
        let store = raw
            .store
            .ok_or_else(|| anyhow::anyhow!("missing required config field: store"))?;
        let pk_fields = raw.pk_fields.unwrap_or_else(|| vec!["id".to_string()]);

        let format = match raw.log_format.as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Human,
        };

        Ok(EngineConfig {
            client_id,
            store,
            pk_fields,
            sort_fields_for_fingerprint: raw.sort_fields_for_fingerprint.unwrap_or(false),
            log: LogConfig {
                level: raw.log_level.unwrap_or_else(|| "info".to_string()),
                format,
            },
        })
    }
}
