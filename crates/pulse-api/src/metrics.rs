//! Handlers for `/metrics` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/metrics/daily/:user_id/:date/:kind` | `status: no_data` when no facts exist |
//! | `GET` | `/metrics/monthly/:user_id/:year/:month/:domain` | rebuilds when stale |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::NaiveDate;
use pulse_core::{
  clock::Clock,
  collab::{PlanGenerator, ScoreEngine},
  date::parse_date,
  facts::FactStore,
  metric::{MetricDomain, ScoreKind, ScoreValue},
  rollup::MonthlyRollup,
  store::HealthStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct DailyScoreResponse {
  pub user_id: Uuid,
  pub date:    NaiveDate,
  pub kind:    ScoreKind,
  pub score:   ScoreValue,
}

/// `GET /metrics/daily/:user_id/:date/:kind`
pub async fn daily<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path((user_id, date, kind)): Path<(Uuid, String, String)>,
) -> Result<Json<DailyScoreResponse>, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let date = parse_date(&date)?;
  let kind = ScoreKind::parse(&kind)
    .ok_or_else(|| ApiError::BadRequest(format!("unknown score kind: {kind}")))?;

  let score = state
    .metrics
    .daily()
    .get_or_compute(user_id, date, kind)
    .await?;
  Ok(Json(DailyScoreResponse { user_id, date, kind, score }))
}

/// `GET /metrics/monthly/:user_id/:year/:month/:domain`
pub async fn monthly<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path((user_id, year, month, domain)): Path<(Uuid, i32, u32, String)>,
) -> Result<Json<MonthlyRollup>, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  if !(1..=12).contains(&month) {
    return Err(ApiError::BadRequest(format!("invalid month: {month}")));
  }
  let domain = MetricDomain::parse(&domain)
    .ok_or_else(|| ApiError::BadRequest(format!("unknown metric domain: {domain}")))?;

  let rollup = state
    .metrics
    .get_or_rebuild(user_id, year, month, domain)
    .await?;
  Ok(Json(rollup))
}
