//! Handlers for `/plans` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/plans/:user_id/:date/:domain` | generates on first fetch |
//! | `POST` | `/plans/:user_id/:date/:domain/regenerate` | rejects the front option |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use pulse_core::{
  clock::Clock,
  collab::{PlanGenerator, ScoreEngine},
  date::parse_date,
  facts::FactStore,
  plan::{PlanDomain, PlanOption, PlanRecord},
  store::HealthStore,
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

fn parse_domain(s: &str) -> Result<PlanDomain, ApiError> {
  PlanDomain::parse(s)
    .ok_or_else(|| ApiError::BadRequest(format!("unknown plan domain: {s}")))
}

/// `GET /plans/:user_id/:date/:domain`
pub async fn get_one<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path((user_id, date, domain)): Path<(Uuid, String, String)>,
) -> Result<Json<PlanRecord>, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let date = parse_date(&date)?;
  let domain = parse_domain(&domain)?;

  let plan = state.plans.get_or_generate(user_id, date, domain).await?;
  Ok(Json(plan))
}

/// `POST /plans/:user_id/:date/:domain/regenerate`
pub async fn regenerate<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path((user_id, date, domain)): Path<(Uuid, String, String)>,
) -> Result<Json<PlanOption>, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let date = parse_date(&date)?;
  let domain = parse_domain(&domain)?;

  let next = state.plans.regenerate(user_id, date, domain).await?;
  Ok(Json(next))
}
