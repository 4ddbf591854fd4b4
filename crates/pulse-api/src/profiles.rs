//! Handlers for `/profiles` endpoints.
//!
//! Updating `diet_preferences` deletes the user's diet plans across the
//! current window so the next fetch regenerates them against the new
//! preferences.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{Duration, Utc};
use pulse_core::{
  clock::Clock,
  collab::{PlanGenerator, ScoreEngine},
  facts::FactStore,
  plan::{PLAN_WINDOW_DAYS, PlanDomain},
  profile::UserProfile,
  store::HealthStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub user_id:            Option<Uuid>,
  pub height_cm:          Option<f64>,
  pub weight_kg:          Option<f64>,
  #[serde(default)]
  pub health_goals:       Vec<String>,
  #[serde(default)]
  pub medical_conditions: Vec<String>,
  #[serde(default)]
  pub diet_preferences:   serde_json::Value,
}

/// `POST /profiles`
pub async fn create<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let mut profile = UserProfile::new(body.user_id.unwrap_or_else(Uuid::new_v4), Utc::now());
  profile.height_cm = body.height_cm;
  profile.weight_kg = body.weight_kg;
  profile.health_goals = body.health_goals;
  profile.medical_conditions = body.medical_conditions;
  profile.diet_preferences = body.diet_preferences;

  state
    .store
    .create_profile(&profile)
    .await
    .map_err(|e| ApiError::from(e.into()))?;
  Ok((StatusCode::CREATED, Json(profile)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /profiles/:user_id`
pub async fn get_one<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let profile = state
    .store
    .get_profile(user_id)
    .await
    .map_err(|e| ApiError::from(e.into()))?
    .ok_or_else(|| ApiError::NotFound(format!("profile {user_id} not found")))?;
  Ok(Json(profile))
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub height_cm:          Option<f64>,
  pub weight_kg:          Option<f64>,
  pub health_goals:       Option<Vec<String>>,
  pub medical_conditions: Option<Vec<String>>,
  pub diet_preferences:   Option<serde_json::Value>,
}

/// `PUT /profiles/:user_id` — partial update; omitted fields keep their
/// stored values.
pub async fn update<S, F, E, G, C>(
  State(state): State<Arc<ApiState<S, F, E, G, C>>>,
  Path(user_id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  G: PlanGenerator,
  C: Clock,
{
  let mut profile = state
    .store
    .get_profile(user_id)
    .await
    .map_err(|e| ApiError::from(e.into()))?
    .ok_or_else(|| ApiError::NotFound(format!("profile {user_id} not found")))?;

  if let Some(v) = body.height_cm {
    profile.height_cm = Some(v);
  }
  if let Some(v) = body.weight_kg {
    profile.weight_kg = Some(v);
  }
  if let Some(v) = body.health_goals {
    profile.health_goals = v;
  }
  if let Some(v) = body.medical_conditions {
    profile.medical_conditions = v;
  }

  let diet_changed = match body.diet_preferences {
    Some(v) if v != profile.diet_preferences => {
      profile.diet_preferences = v;
      true
    }
    _ => false,
  };

  state
    .store
    .update_profile(&profile)
    .await
    .map_err(|e| ApiError::from(e.into()))?;

  if diet_changed {
    // New preferences make the window's diet plans obsolete; the next
    // fetch (or the next sweep) regenerates them.
    let today = state.clock.today();
    for offset in 0..PLAN_WINDOW_DAYS {
      state
        .plans
        .delete(user_id, today + Duration::days(offset), PlanDomain::Diet)
        .await?;
    }
  }

  Ok(Json(profile))
}
