mod config;
mod demo_adapters;
mod logging;

use clap::{Parser, Subcommand};
use config::{ConfigOverrides, EngineConfig, RawEngineConfig};
use delta_cycle::{run_cycle, CycleConfig};
use delta_store::{AnyBaselineStore, BaselineStore, RelationalBaselineStore};
use demo_adapters::{FileAppendTarget, FilePopulationSource, NdjsonDemoMapper};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "delta-cli", about = "Run delta-sync cycles and inspect cycle history")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs one cycle against the configured baseline store, using
    /// filesystem-backed demo source/target adapters.
    RunCycle {
        #[command(flatten)]
        overrides: ConfigOverrides,

        /// NDJSON population file read as this cycle's source payload.
        #[arg(long)]
        population: PathBuf,

        /// File the demo target appends applied operations to.
        #[arg(long)]
        applied_log: PathBuf,
    },

    /// Prints recent `delta_history` rows for a client (relational
    /// backends only).
    History {
        #[arg(long, env = "DELTA_CONFIG_PATH")]
        config: PathBuf,

        #[arg(long)]
        client_id: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::RunCycle {
            overrides,
            population,
            applied_log,
        } => run_cycle_command(overrides, population, applied_log).await,
        Command::History {
            config,
            client_id,
            limit,
        } => history_command(config, client_id, limit).await,
    }
}

async fn run_cycle_command(
    overrides: ConfigOverrides,
    population: PathBuf,
    applied_log: PathBuf,
) -> anyhow::Result<()> {
    let engine_config = EngineConfig::resolve(&overrides)?;
    logging::init(&engine_config.log);

    let store = AnyBaselineStore::connect(&engine_config.store).await?;
    store
        .as_baseline_store()
        .initialize(&engine_config.client_id, &engine_config.pk_fields)
        .await?;

    let cfg = CycleConfig {
        client_id: engine_config.client_id.clone(),
        source: Arc::new(FilePopulationSource { path: population }),
        mapper: Arc::new(NdjsonDemoMapper),
        target: Arc::new(FileAppendTarget::open(applied_log).await?),
        baseline: Arc::new(store),
    };

    let report = run_cycle(&cfg).await?;
    tracing::info!(
        added = report.added,
        updated = report.updated,
        removed = report.removed,
        failures = report.failure_count,
        duration_ms = report.duration.as_millis() as u64,
        message = report.message.as_deref().unwrap_or(""),
        "cycle complete"
    );
    Ok(())
}

async fn history_command(config_path: PathBuf, client_id: String, limit: usize) -> anyhow::Result<()> {
    let raw = RawEngineConfig::from_file(&config_path)?;
    let store_config = raw
        .store
        .ok_or_else(|| anyhow::anyhow!("config file does not name a store"))?;
    let store = AnyBaselineStore::connect(&store_config).await?;
    let relational = store
        .as_relational()
        .ok_or_else(|| anyhow::anyhow!("history requires a relational baseline store"))?;

    let rows = relational.get_history(&client_id, limit).await?;
    for row in rows {
        println!(
            "{} {} added={} updated={} removed={} at={}",
            row.id, row.client_id, row.added_count, row.updated_count, row.removed_count, row.created_at
        );
    }
    Ok(())
}
