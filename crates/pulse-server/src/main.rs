//! Pulse server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the
//! SQLite store, reconciles the plan window, starts the daily sweep task,
//! and serves the JSON API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use pulse_core::clock::ReferenceClock;
use pulse_plan::PlanService;
use pulse_scheduler::Scheduler;
use pulse_server::{ServerConfig, collab::TemplatePlanGenerator};
use pulse_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pulse health metrics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PULSE"))
    .build()
    .context("failed to read config")?;
  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.validate().context("invalid configuration")?;

  let clock = ReferenceClock::from_offset_secs(server_cfg.utc_offset_secs)
    .context("utc_offset_secs is out of range")?;

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  // The scheduler owns its own plan service over the same store.
  let scheduler = Arc::new(Scheduler::new(
    store.clone(),
    PlanService::new(store.clone(), TemplatePlanGenerator),
    clock,
    server_cfg.sweep_hour,
  ));

  // Heal any downtime gap in the plan window before accepting traffic.
  let report = scheduler.run_startup_reconcile().await;
  tracing::info!(
    users = report.users_processed,
    generated = report.plans_generated,
    expired = report.plans_expired,
    failures = report.failures,
    "startup reconcile complete"
  );
  scheduler.clone().spawn();

  let state = pulse_server::build_state(store, clock);
  let app = pulse_server::router(state);

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
