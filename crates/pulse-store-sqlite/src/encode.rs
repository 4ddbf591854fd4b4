//! Conversions between domain types and their stored column text.
//!
//! All timestamps are stored as RFC 3339 strings. Structured fields (option
//! lists, rollups, sample arrays, disliked logs) are stored as compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use pulse_core::{
  facts::FactSession,
  metric::{DailyMetricRecord, MetricDomain},
  plan::{PlanDomain, PlanRecord},
  profile::UserProfile,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Domains ─────────────────────────────────────────────────────────────────

pub fn decode_metric_domain(s: &str) -> Result<MetricDomain> {
  MetricDomain::parse(s).ok_or_else(|| Error::UnknownDomain(s.to_owned()))
}

pub fn decode_plan_domain(s: &str) -> Result<PlanDomain> {
  PlanDomain::parse(s).ok_or_else(|| Error::UnknownDomain(s.to_owned()))
}

/// The `monthly_metrics` column holding a domain's cached rollup.
pub fn rollup_column(domain: MetricDomain) -> &'static str {
  match domain {
    MetricDomain::Activity => "rollup_activity",
    MetricDomain::Sleep => "rollup_sleep",
    MetricDomain::Food => "rollup_food",
    MetricDomain::Steps => "rollup_steps",
    MetricDomain::Weight => "rollup_weight",
    MetricDomain::HeartRate => "rollup_heart_rate",
    MetricDomain::Medication => "rollup_medication",
  }
}

// ─── JSON columns ────────────────────────────────────────────────────────────

pub fn encode_json<T: serde::Serialize>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: serde::de::DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `daily_metrics` row.
pub struct RawDaily {
  pub user_id:                 String,
  pub day_id:                  String,
  pub activity_score:          Option<f64>,
  pub sleep_score:             Option<f64>,
  pub food_score:              Option<f64>,
  pub metabolic_score:         Option<f64>,
  pub metabolic_score_history: String,
  pub total_energy_burned:     Option<f64>,
  pub total_steps:             Option<i64>,
  pub distance_covered_m:      Option<f64>,
  pub weight_kg:               Option<f64>,
  pub resting_heart_rate:      Option<f64>,
  pub max_heart_rate:          Option<f64>,
  pub min_heart_rate:          Option<f64>,
  pub heart_rate_samples:      String,
  pub medication_adherence:    Option<f64>,
  pub created_at:              String,
  pub updated_at:              String,
}

impl RawDaily {
  pub fn into_record(self) -> Result<DailyMetricRecord> {
    Ok(DailyMetricRecord {
      user_id: decode_uuid(&self.user_id)?,
      day_id: decode_uuid(&self.day_id)?,
      activity_score: self.activity_score,
      sleep_score: self.sleep_score,
      food_score: self.food_score,
      metabolic_score: self.metabolic_score,
      metabolic_score_history: decode_json(&self.metabolic_score_history)?,
      total_energy_burned: self.total_energy_burned,
      total_steps: self.total_steps,
      distance_covered_m: self.distance_covered_m,
      weight_kg: self.weight_kg,
      resting_heart_rate: self.resting_heart_rate,
      max_heart_rate: self.max_heart_rate,
      min_heart_rate: self.min_heart_rate,
      heart_rate_samples: decode_json(&self.heart_rate_samples)?,
      medication_adherence: self.medication_adherence,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `plans` row.
pub struct RawPlan {
  pub plan_id:      String,
  pub user_id:      String,
  pub day_id:       String,
  pub domain:       String,
  pub options_json: String,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawPlan {
  pub fn into_plan(self) -> Result<PlanRecord> {
    Ok(PlanRecord {
      plan_id: decode_uuid(&self.plan_id)?,
      user_id: decode_uuid(&self.user_id)?,
      day_id: decode_uuid(&self.day_id)?,
      domain: decode_plan_domain(&self.domain)?,
      options: decode_json(&self.options_json)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `fact_sessions` row.
pub struct RawSession {
  pub session_id:   String,
  pub user_id:      String,
  pub day_id:       String,
  pub domain:       String,
  pub recorded_at:  String,
  pub payload_json: String,
}

impl RawSession {
  pub fn into_session(self) -> Result<FactSession> {
    Ok(FactSession {
      session_id: decode_uuid(&self.session_id)?,
      user_id: decode_uuid(&self.user_id)?,
      day_id: decode_uuid(&self.day_id)?,
      domain: decode_metric_domain(&self.domain)?,
      recorded_at: decode_dt(&self.recorded_at)?,
      payload: decode_json(&self.payload_json)?,
    })
  }
}

/// Raw strings read directly from a `user_profiles` row.
pub struct RawProfile {
  pub user_id:            String,
  pub created_at:         String,
  pub height_cm:          Option<f64>,
  pub weight_kg:          Option<f64>,
  pub health_goals:       String,
  pub medical_conditions: String,
  pub diet_preferences:   String,
  pub disliked_meals:     String,
  pub disliked_workouts:  String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<UserProfile> {
    Ok(UserProfile {
      user_id: decode_uuid(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
      height_cm: self.height_cm,
      weight_kg: self.weight_kg,
      health_goals: decode_json(&self.health_goals)?,
      medical_conditions: decode_json(&self.medical_conditions)?,
      diet_preferences: decode_json(&self.diet_preferences)?,
      disliked_meals: decode_json(&self.disliked_meals)?,
      disliked_workouts: decode_json(&self.disliked_workouts)?,
    })
  }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// Compose a `NaiveDate` from chain components read out of a join.
pub fn compose_date(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, day)
    .ok_or_else(|| Error::DateParse(format!("invalid date {year:04}-{month:02}-{day:02}")))
}
