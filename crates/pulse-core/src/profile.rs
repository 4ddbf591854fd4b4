//! User profile — the envelope the collaborators score and generate
//! against, and the home of the bounded disliked-option logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::{DislikedOption, PlanDomain, push_disliked};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:    Uuid,
  pub created_at: DateTime<Utc>,

  pub height_cm: Option<f64>,
  pub weight_kg: Option<f64>,

  #[serde(default)]
  pub health_goals:       Vec<String>,
  #[serde(default)]
  pub medical_conditions: Vec<String>,

  /// Free-form preference payload consumed by the generation collaborator.
  #[serde(default)]
  pub diet_preferences: serde_json::Value,

  #[serde(default)]
  pub disliked_meals:    Vec<DislikedOption>,
  #[serde(default)]
  pub disliked_workouts: Vec<DislikedOption>,
}

impl UserProfile {
  pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      created_at: now,
      height_cm: None,
      weight_kg: None,
      health_goals: Vec::new(),
      medical_conditions: Vec::new(),
      diet_preferences: serde_json::Value::Null,
      disliked_meals: Vec::new(),
      disliked_workouts: Vec::new(),
    }
  }

  pub fn disliked(&self, domain: PlanDomain) -> &[DislikedOption] {
    match domain {
      PlanDomain::Diet => &self.disliked_meals,
      PlanDomain::Exercise => &self.disliked_workouts,
    }
  }

  /// Append to the domain's disliked log, evicting beyond the cap.
  pub fn push_disliked(&mut self, domain: PlanDomain, entry: DislikedOption) {
    let log = match domain {
      PlanDomain::Diet => &mut self.disliked_meals,
      PlanDomain::Exercise => &mut self.disliked_workouts,
    };
    push_disliked(log, entry);
  }

  pub fn bmi(&self) -> Option<f64> {
    let (weight, height) = (self.weight_kg?, self.height_cm?);
    if height <= 0.0 {
      return None;
    }
    let height_m = height / 100.0;
    Some(weight / (height_m * height_m))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bmi_requires_both_measurements() {
    let mut profile = UserProfile::new(Uuid::new_v4(), Utc::now());
    assert_eq!(profile.bmi(), None);

    profile.weight_kg = Some(72.0);
    profile.height_cm = Some(180.0);
    let bmi = profile.bmi().unwrap();
    assert!((bmi - 22.2).abs() < 0.1);
  }

  #[test]
  fn disliked_logs_are_independent_per_domain() {
    let mut profile = UserProfile::new(Uuid::new_v4(), Utc::now());
    profile.push_disliked(
      PlanDomain::Diet,
      DislikedOption { name: "oats".into(), recorded_at: Utc::now() },
    );
    assert_eq!(profile.disliked(PlanDomain::Diet).len(), 1);
    assert!(profile.disliked(PlanDomain::Exercise).is_empty());
  }
}
