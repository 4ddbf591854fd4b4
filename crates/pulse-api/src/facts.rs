//! Handler for raw-fact ingestion.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pulse_core::{
  clock::Clock,
  collab::{PlanGenerator, ScoreEngine},
  date::parse_date,
  facts::{FactStore, NewFactSession},
  metric::MetricDomain,
  store::HealthStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `POST /facts/:user_id/:date/:domain` — body is the opaque session
/// payload. `recorded_at` is assigned server-side; the cached score for
/// the day's dependent kind is cleared as a side effect.
pub async fn ingest<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path((user_id, date, domain)): Path<(Uuid, String, String)>,
  Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let date = parse_date(&date)?;
  let domain = MetricDomain::parse(&domain)
    .ok_or_else(|| ApiError::BadRequest(format!("unknown metric domain: {domain}")))?;

  let session = state
    .store
    .record_session(NewFactSession { user_id, date, domain, payload })
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok((StatusCode::CREATED, Json(session)))
}
