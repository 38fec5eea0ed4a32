use crate::adapters::{Mapper, SourceAdapter, TargetAdapter};
use crate::error::CycleError;
use crate::repair::{repair, RepairOutcome};
use delta_engine::compute_set_diff;
use delta_model::{fingerprint, reduce, FieldSet, FingerprintOptions};
use delta_store::{AnyBaselineStore, BaselineStore, RelationalBaselineStore};
use delta_validate::validate_row;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::instrument;

/// Everything a cycle needs to run once for one client (spec §4.7, §6).
pub struct CycleConfig {
    pub client_id: String,
    pub source: Arc<dyn SourceAdapter>,
    pub mapper: Arc<dyn Mapper>,
    pub target: Arc<dyn TargetAdapter>,
    pub baseline: Arc<AnyBaselineStore>,
}

/// The terse structured result a cycle reports (spec §7): counts, timing,
/// and an optional message. Per-record detail lives in history (relational)
/// or is left to the caller's own logging of the push result.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub client_id: String,
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub failure_count: usize,
    pub duration: Duration,
    pub message: Option<String>,
}

impl CycleReport {
    fn no_changes(client_id: &str, duration: Duration) -> Self {
        CycleReport {
            client_id: client_id.to_string(),
            added: 0,
            updated: 0,
            removed: 0,
            failure_count: 0,
            duration,
            message: Some("no changes".to_string()),
        }
    }
}

fn pk_key(record: &FieldSet, pk_fields: &[String]) -> String {
    record.pk_joined(pk_fields)
}

/// Runs one cycle to completion: pull, map, validate+fingerprint, project,
/// compute delta, push, repair, commit (spec §4.7). The only public
/// operation of the orchestrator.
#[instrument(skip(cfg), fields(client_id = %cfg.client_id))]
pub async fn run_cycle(cfg: &CycleConfig) -> Result<CycleReport, CycleError> {
    let start = Instant::now();

    let raw = cfg.source.fetch_raw().await?;
    let (schema, mut records) = cfg.mapper.map(raw).await?;
    let pk_fields = schema.pk_fields();

    for record in &mut records {
        if validate_row(&schema, record) {
            record.hash = Some(fingerprint(record, FingerprintOptions { sort: false })?);
        }
    }

    let current_projection: Vec<FieldSet> =
        records.iter().map(|r| reduce(r, &pk_fields)).collect();

    let (delta, previous_projection) = match cfg.baseline.as_ref() {
        AnyBaselineStore::Relational(store) => {
            store
                .store_current(&cfg.client_id, current_projection.clone(), &pk_fields)
                .await?;
            let delta = store.fetch_delta(&cfg.client_id, &pk_fields).await?;
            (delta, Vec::new())
        }
        _ => {
            let store = cfg.baseline.as_baseline_store();
            let previous = store
                .fetch_previous(&cfg.client_id, &pk_fields, None)
                .await?;
            let delta = compute_set_diff(&previous, &current_projection, &pk_fields);
            (delta, previous)
        }
    };

    if delta.is_empty() {
        tracing::info!("no changes this cycle");
        return Ok(CycleReport::no_changes(&cfg.client_id, start.elapsed()));
    }

    let push_result = cfg.target.push_all(&delta).await?;

    let previous_for_repair = match cfg.baseline.as_ref() {
        AnyBaselineStore::Relational(store) => {
            let mut wanted: HashSet<String> = push_result
                .failures
                .iter()
                .map(|f| {
                    let names: Vec<String> = f.primary_key.iter().map(|fv| fv.name.clone()).collect();
                    FieldSet::new(f.primary_key.clone()).pk_joined(&names)
                })
                .collect();
            for record in &current_projection {
                if !record.validation_messages.is_empty() {
                    wanted.insert(pk_key(record, &pk_fields));
                }
            }
            let limit_to: Vec<FieldSet> = current_projection
                .iter()
                .filter(|r| wanted.contains(&pk_key(r, &pk_fields)))
                .cloned()
                .collect();
            store
                .fetch_previous(&cfg.client_id, &pk_fields, Some(&limit_to))
                .await?
        }
        _ => previous_projection,
    };

    let (added, updated, removed) = delta.counts();
    let RepairOutcome {
        current: repaired,
        restored,
    } = repair(current_projection, &previous_for_repair, &push_result, &pk_fields);

    cfg.baseline
        .as_baseline_store()
        .update_previous(&cfg.client_id, repaired, &pk_fields, restored)
        .await?;

    Ok(CycleReport {
        client_id: cfg.client_id.clone(),
        added,
        updated,
        removed,
        failure_count: restored,
        duration: start.elapsed(),
        message: push_result.message,
    })
}
