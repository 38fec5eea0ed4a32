use async_trait::async_trait;
use bytes::Bytes;
use delta_cycle::{
    run_cycle, CycleConfig, CycleError, Crud, Mapper, PushStatus, SingleResult, SourceAdapter,
    TargetAdapter,
};
use delta_model::{Field, FieldDefinition, FieldSet, FieldType, Schema, Value};
use delta_store::{filesystem, AnyBaselineStore, BaselineStore};
use std::sync::{Arc, Mutex};

struct FixedSource;

#[async_trait]
impl SourceAdapter for FixedSource {
    async fn fetch_raw(&self) -> Result<Bytes, CycleError> {
        Ok(Bytes::new())
    }
}

/// Ignores the raw payload and returns whatever rows were configured,
/// standing in for a real Mapper in tests.
struct FixedMapper {
    schema: Schema,
    rows: Vec<FieldSet>,
}

#[async_trait]
impl Mapper for FixedMapper {
    async fn map(&self, _raw: Bytes) -> Result<(Schema, Vec<FieldSet>), CycleError> {
        Ok((self.schema.clone(), self.rows.clone()))
    }
}

/// Accepts every push. Records what it was asked to push for assertions.
#[derive(Default)]
struct AcceptingTarget {
    pushed: Mutex<Vec<(Vec<Field>, Crud)>>,
}

#[async_trait]
impl TargetAdapter for AcceptingTarget {
    async fn push_one(&self, record: &FieldSet, crud: Crud) -> Result<SingleResult, CycleError> {
        self.pushed.lock().unwrap().push((record.fields.clone(), crud));
        Ok(SingleResult {
            status: PushStatus::Success,
            primary_key: record.fields.clone(),
            crud,
            message: None,
        })
    }
}

/// Fails every push for the given ids, succeeds for everything else.
struct SelectivelyFailingTarget {
    fail_ids: Vec<i64>,
}

#[async_trait]
impl TargetAdapter for SelectivelyFailingTarget {
    async fn push_one(&self, record: &FieldSet, crud: Crud) -> Result<SingleResult, CycleError> {
        let id = record.get("id").and_then(|v| match v {
            Value::Number(n) => n.as_i64(),
            _ => None,
        });
        let status = if id.map(|i| self.fail_ids.contains(&i)).unwrap_or(false) {
            PushStatus::Failure
        } else {
            PushStatus::Success
        };
        Ok(SingleResult {
            status,
            primary_key: record.fields.clone(),
            crud,
            message: None,
        })
    }
}

fn id_schema() -> Schema {
    Schema::new(vec![FieldDefinition::new("id", FieldType::Number).primary_key()])
}

fn row(id: i64) -> FieldSet {
    FieldSet::new(vec![Field::new("id", Value::from(id))])
}

#[tokio::test]
async fn s1_pure_add_advances_the_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AnyBaselineStore::Filesystem(Arc::new(filesystem(dir.path()).unwrap())));
    let pk_fields = vec!["id".to_string()];
    store.as_baseline_store().initialize("acme", &pk_fields).await.unwrap();

    let cfg = CycleConfig {
        client_id: "acme".to_string(),
        source: Arc::new(FixedSource),
        mapper: Arc::new(FixedMapper {
            schema: id_schema(),
            rows: vec![row(1), row(2)],
        }),
        target: Arc::new(AcceptingTarget::default()),
        baseline: store.clone(),
    };

    let report = run_cycle(&cfg).await.unwrap();
    assert_eq!((report.added, report.updated, report.removed), (2, 0, 0));
    assert_eq!(report.failure_count, 0);

    let baseline = store
        .as_baseline_store()
        .fetch_previous("acme", &pk_fields, None)
        .await
        .unwrap();
    assert_eq!(baseline.len(), 2);
}

#[tokio::test]
async fn second_identical_cycle_reports_no_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AnyBaselineStore::Filesystem(Arc::new(filesystem(dir.path()).unwrap())));
    let pk_fields = vec!["id".to_string()];
    store.as_baseline_store().initialize("acme", &pk_fields).await.unwrap();

    let make_cfg = || CycleConfig {
        client_id: "acme".to_string(),
        source: Arc::new(FixedSource),
        mapper: Arc::new(FixedMapper {
            schema: id_schema(),
            rows: vec![row(1), row(2)],
        }),
        target: Arc::new(AcceptingTarget::default()),
        baseline: store.clone(),
    };

    run_cycle(&make_cfg()).await.unwrap();
    let second = run_cycle(&make_cfg()).await.unwrap();
    assert_eq!(second.message.as_deref(), Some("no changes"));
    assert_eq!((second.added, second.updated, second.removed), (0, 0, 0));
}

#[tokio::test]
async fn s5_failed_new_record_is_retried_next_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(AnyBaselineStore::Filesystem(Arc::new(filesystem(dir.path()).unwrap())));
    let pk_fields = vec!["id".to_string()];
    store.as_baseline_store().initialize("acme", &pk_fields).await.unwrap();

    let cfg = CycleConfig {
        client_id: "acme".to_string(),
        source: Arc::new(FixedSource),
        mapper: Arc::new(FixedMapper {
            schema: id_schema(),
            rows: vec![row(1), row(2)],
        }),
        target: Arc::new(SelectivelyFailingTarget { fail_ids: vec![1] }),
        baseline: store.clone(),
    };

    let report = run_cycle(&cfg).await.unwrap();
    assert_eq!(report.failure_count, 1);

    let baseline = store
        .as_baseline_store()
        .fetch_previous("acme", &pk_fields, None)
        .await
        .unwrap();
    assert_eq!(baseline.len(), 1);
    assert_eq!(baseline[0].get("id").unwrap(), &Value::from(2i64));
}
