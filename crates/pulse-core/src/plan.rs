//! Generated plan types — ranked option lists per (user, day, domain).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── PlanDomain ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanDomain {
  Diet,
  Exercise,
}

impl PlanDomain {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Diet => "diet",
      Self::Exercise => "exercise",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "diet" => Some(Self::Diet),
      "exercise" => Some(Self::Exercise),
      _ => None,
    }
  }

  /// How many options a fresh generation batch must contain.
  pub fn target_option_count(&self) -> usize {
    match self {
      Self::Diet => 4,
      Self::Exercise => 3,
    }
  }

  pub const ALL: [PlanDomain; 2] = [Self::Diet, Self::Exercise];
}

impl std::fmt::Display for PlanDomain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// One ranked candidate (a meal or a workout). Self-contained; position in
/// the list is the rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOption {
  pub name:             String,
  pub calories:         Option<f64>,
  pub duration_minutes: Option<u32>,
  /// Marginal annotation the generator may attach ("high protein", …).
  pub benefit:          Option<String>,
  /// Free-form generator payload (ingredients, sets/reps, …).
  #[serde(default)]
  pub details:          serde_json::Value,
}

impl PlanOption {
  /// Convenience constructor for an option with only a name.
  pub fn named(name: impl Into<String>) -> Self {
    Self {
      name:             name.into(),
      calories:         None,
      duration_minutes: None,
      benefit:          None,
      details:          serde_json::Value::Null,
    }
  }
}

// ─── PlanRecord ──────────────────────────────────────────────────────────────

/// A stored plan. Invariant: `options` is never empty once generated;
/// rotation preserves length, regeneration grows it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
  pub plan_id:    Uuid,
  pub user_id:    Uuid,
  pub day_id:     Uuid,
  pub domain:     PlanDomain,
  pub options:    Vec<PlanOption>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Days in the sliding plan window, today included. Every user should hold
/// plans for exactly `[today, today + PLAN_WINDOW_DAYS - 1]` per domain.
pub const PLAN_WINDOW_DAYS: i64 = 7;

// ─── Disliked log ────────────────────────────────────────────────────────────

/// Maximum entries kept per domain in a user's disliked-option log.
pub const DISLIKED_LOG_CAP: usize = 30;

/// A previously rejected option, kept to bias future generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DislikedOption {
  pub name:        String,
  pub recorded_at: DateTime<Utc>,
}

/// Append to a disliked log, evicting the oldest entries beyond the cap.
pub fn push_disliked(log: &mut Vec<DislikedOption>, entry: DislikedOption) {
  log.push(entry);
  if log.len() > DISLIKED_LOG_CAP {
    let excess = log.len() - DISLIKED_LOG_CAP;
    log.drain(..excess);
  }
}
