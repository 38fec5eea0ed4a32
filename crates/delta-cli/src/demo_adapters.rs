use async_trait::async_trait;
use bytes::Bytes;
use delta_cycle::{Crud, CycleError, Mapper, PushStatus, SingleResult, SourceAdapter, TargetAdapter};
use delta_model::{Field, FieldDefinition, FieldSet, FieldType, Schema, Value};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Reads the whole population file as the cycle's raw payload. Stands in
/// for a real source adapter (spec §6): this crate's only job is to be
/// runnable end-to-end, not to integrate a real upstream.
pub struct FilePopulationSource {
    pub path: PathBuf,
}

#[async_trait]
impl SourceAdapter for FilePopulationSource {
    async fn fetch_raw(&self) -> Result<Bytes, CycleError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CycleError::Source(e.into()))?;
        Ok(Bytes::from(bytes))
    }
}

/// Parses one flat JSON object per line. The first field of the first
/// record becomes the (sole) primary key; every field is typed `String`
/// except values that parse as JSON numbers.
pub struct NdjsonDemoMapper;

#[async_trait]
impl Mapper for NdjsonDemoMapper {
    async fn map(&self, raw: Bytes) -> Result<(Schema, Vec<FieldSet>), CycleError> {
        let text = String::from_utf8_lossy(&raw);
        let mut records = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(line)
                .map_err(|e| CycleError::Mapper(e.into()))?;
            let serde_json::Value::Object(map) = value else {
                return Err(CycleError::Mapper(anyhow::anyhow!(
                    "demo population line is not a JSON object"
                )));
            };
            let fields = map
                .into_iter()
                .map(|(name, v)| Field::new(name, Value::from(v)))
                .collect();
            records.push(FieldSet::new(fields));
        }

        let pk_name = records
            .first()
            .and_then(|r| r.fields.first())
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "id".to_string());

        let mut fields = vec![FieldDefinition::new(&pk_name, FieldType::String).primary_key()];
        if let Some(first) = records.first() {
            for f in &first.fields {
                if f.name != pk_name {
                    fields.push(FieldDefinition::new(&f.name, FieldType::String));
                }
            }
        }

        Ok((Schema::new(fields), records))
    }
}

/// Appends one NDJSON line per applied operation to an output file,
/// standing in for a real downstream target (spec §6). Every push
/// succeeds; this adapter exists for manual/smoke-test operation, not to
/// exercise push-failure handling (see `delta-cycle`'s own tests for that).
pub struct FileAppendTarget {
    file: Mutex<tokio::fs::File>,
}

impl FileAppendTarget {
    pub async fn open(path: PathBuf) -> std::io::Result<Self> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(FileAppendTarget {
            file: Mutex::new(file),
        })
    }
}

#[async_trait]
impl TargetAdapter for FileAppendTarget {
    async fn push_one(&self, record: &FieldSet, crud: Crud) -> Result<SingleResult, CycleError> {
        use tokio::io::AsyncWriteExt;

        let crud_name = match crud {
            Crud::Create => "create",
            Crud::Update => "update",
            Crud::Delete => "delete",
        };
        let mut line = serde_json::to_vec(record).map_err(|e| CycleError::Target(e.into()))?;
        let mut prefixed = Vec::new();
        write!(prefixed, "{{\"crud\":\"{crud_name}\",\"record\":").map_err(|e| CycleError::Target(e.into()))?;
        prefixed.append(&mut line);
        prefixed.push(b'}');
        prefixed.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&prefixed)
            .await
            .map_err(|e| CycleError::Target(e.into()))?;

        Ok(SingleResult {
            status: PushStatus::Success,
            primary_key: record.fields.clone(),
            crud,
            message: None,
        })
    }
}
