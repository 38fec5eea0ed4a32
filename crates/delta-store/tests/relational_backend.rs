use delta_model::{Field, FieldSet};
use delta_store::{connect_relational, BaselineStore, RelationalBaselineStore, RelationalConfig, RelationalKind, RelationalStore};

fn record(id: &str, hash: &str) -> FieldSet {
    let mut r = FieldSet::new(vec![Field::new("id", id)]);
    r.hash = Some(hash.to_string());
    r
}

async fn in_memory_store() -> RelationalStore {
    let config = RelationalConfig {
        kind: RelationalKind::Sqlite,
        host: None,
        port: None,
        username: None,
        password: None,
        database: None,
        filename: Some(":memory:".to_string()),
        ssl: false,
        logging: false,
    };
    let pool = connect_relational(&config).await.unwrap();
    RelationalStore::new(pool)
}

#[tokio::test]
async fn rejects_empty_pk_fields_at_initialize() {
    let store = in_memory_store().await;
    let err = store.initialize("acme", &[]).await.unwrap_err();
    assert!(matches!(err, delta_store::StoreError::Config(_)));
}

#[tokio::test]
async fn uninitialized_client_is_rejected() {
    let store = in_memory_store().await;
    let pk_fields = vec!["id".to_string()];
    let err = store.fetch_previous("acme", &pk_fields, None).await.unwrap_err();
    assert!(matches!(err, delta_store::StoreError::NotInitialized { .. }));
}

#[tokio::test]
async fn store_current_then_fetch_delta_classifies_rows() {
    let store = in_memory_store().await;
    let pk_fields = vec!["id".to_string()];
    store.initialize("acme", &pk_fields).await.unwrap();

    // First cycle: everything is new.
    store
        .store_current("acme", vec![record("1", "h1"), record("2", "h2")], &pk_fields)
        .await
        .unwrap();
    let delta = store.fetch_delta("acme", &pk_fields).await.unwrap();
    assert_eq!(delta.counts(), (2, 0, 0));

    store
        .update_previous("acme", Vec::new(), &pk_fields, 0)
        .await
        .unwrap();

    // Second cycle: id 1 changes, id 2 disappears, id 3 is new.
    store
        .store_current("acme", vec![record("1", "h1-changed"), record("3", "h3")], &pk_fields)
        .await
        .unwrap();
    let delta = store.fetch_delta("acme", &pk_fields).await.unwrap();
    assert_eq!(delta.counts(), (1, 1, 1));

    let history = store.get_history("acme", 10).await.unwrap();
    assert_eq!(history.len(), 2);
}
