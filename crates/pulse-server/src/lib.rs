//! Pulse server assembly: configuration, baseline collaborators, and the
//! HTTP router over an SQLite-backed store.

pub mod collab;

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use pulse_api::ApiState;
use pulse_core::clock::{DEFAULT_OFFSET_SECS, ReferenceClock};
use pulse_metrics::{DailyMetricCache, MonthlyMetricCache};
use pulse_plan::PlanService;
use pulse_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::collab::{BaselineScoreEngine, TemplatePlanGenerator};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:            String,
  #[serde(default = "default_port")]
  pub port:            u16,
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// Hour of day (reference timezone) the daily plan sweep fires at.
  #[serde(default = "default_sweep_hour")]
  pub sweep_hour:      u32,
  /// Reference timezone as seconds east of UTC.
  #[serde(default = "default_offset_secs")]
  pub utc_offset_secs: i32,
}

impl ServerConfig {
  /// Checks the constraints serde cannot express. `sweep_hour` must be a
  /// real hour of day; out-of-range values are rejected here instead of
  /// being silently coerced when the sweep timer arms.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.sweep_hour > 23 {
      return Err(ConfigError::SweepHourOutOfRange(self.sweep_hour));
    }
    Ok(())
  }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("sweep_hour must be between 0 and 23, got {0}")]
  SweepHourOutOfRange(u32),
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("pulse.db") }
fn default_sweep_hour() -> u32 { 12 }
fn default_offset_secs() -> i32 { DEFAULT_OFFSET_SECS }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            default_host(),
      port:            default_port(),
      store_path:      default_store_path(),
      sweep_hour:      default_sweep_hour(),
      utc_offset_secs: default_offset_secs(),
    }
  }
}

// ─── State and router ────────────────────────────────────────────────────────

/// The concrete handler state for this deployment.
pub type AppState =
  ApiState<SqliteStore, SqliteStore, BaselineScoreEngine, TemplatePlanGenerator, ReferenceClock>;

pub fn build_state(store: SqliteStore, clock: ReferenceClock) -> Arc<AppState> {
  let daily =
    DailyMetricCache::new(store.clone(), store.clone(), BaselineScoreEngine, clock);
  Arc::new(ApiState {
    metrics: MonthlyMetricCache::new(daily),
    plans: PlanService::new(store.clone(), TemplatePlanGenerator),
    store,
    clock,
  })
}

pub fn router(state: Arc<AppState>) -> Router {
  Router::new()
    .nest("/api", pulse_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
