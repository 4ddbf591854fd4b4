//! Baseline collaborators.
//!
//! Deterministic stand-ins wired in so the server runs end to end without
//! the external scoring and generation systems. They honour the
//! collaborator contracts (purity, batch sizes, disliked bias) but make no
//! claim to domain accuracy.

use pulse_core::{
  collab::{PlanGenerator, ScoreEngine},
  facts::FactSet,
  metric::ScoreKind,
  plan::{DislikedOption, PlanDomain, PlanOption},
  profile::UserProfile,
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("baseline collaborator error: {0}")]
pub struct CollabError(String);

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// Scores purely from session presence: a floor for having any data at
/// all, a bonus per session, capped at 100.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaselineScoreEngine;

impl ScoreEngine for BaselineScoreEngine {
  type Error = CollabError;

  async fn compute(
    &self,
    _kind: ScoreKind,
    facts: &FactSet,
    _profile: &UserProfile,
  ) -> Result<f64, Self::Error> {
    if facts.is_empty() {
      // The cache filters this case out before calling us.
      return Err(CollabError("no facts to score".into()));
    }
    let score = 40.0 + 15.0 * facts.sessions.len() as f64;
    Ok(score.min(100.0))
  }
}

// ─── Generation ──────────────────────────────────────────────────────────────

const DIET_TEMPLATES: &[&str] = &[
  "oats porridge with fruit",
  "grilled paneer salad",
  "lentil soup with whole-grain toast",
  "vegetable khichdi",
  "sprout chaat",
  "curd rice with cucumber",
  "chickpea wrap",
];

const EXERCISE_TEMPLATES: &[&str] = &[
  "30-minute brisk walk",
  "bodyweight circuit",
  "20-minute yoga flow",
  "stationary cycling",
  "stair intervals",
];

/// Serves options from fixed template lists, skipping names the user has
/// recently disliked. Falls back to the full list when everything has
/// been disliked, since an empty batch is a contract violation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePlanGenerator;

impl PlanGenerator for TemplatePlanGenerator {
  type Error = CollabError;

  async fn generate(
    &self,
    domain: PlanDomain,
    _profile: &UserProfile,
    disliked: &[DislikedOption],
  ) -> Result<Vec<PlanOption>, Self::Error> {
    let templates = match domain {
      PlanDomain::Diet => DIET_TEMPLATES,
      PlanDomain::Exercise => EXERCISE_TEMPLATES,
    };
    let target = domain.target_option_count();

    let mut options: Vec<PlanOption> = templates
      .iter()
      .filter(|name| !disliked.iter().any(|d| d.name == **name))
      .take(target)
      .map(|name| PlanOption::named(*name))
      .collect();

    if options.len() < target {
      for name in templates {
        if options.len() >= target {
          break;
        }
        if !options.iter().any(|o| o.name == *name) {
          options.push(PlanOption::named(*name));
        }
      }
    }

    Ok(options)
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use pulse_core::{
    facts::{FactSession, FactSet},
    metric::MetricDomain,
  };
  use uuid::Uuid;

  use super::*;

  fn facts_with(n: usize) -> FactSet {
    FactSet {
      domain:   MetricDomain::Sleep,
      sessions: (0..n)
        .map(|_| FactSession {
          session_id:  Uuid::new_v4(),
          user_id:     Uuid::new_v4(),
          day_id:      Uuid::new_v4(),
          domain:      MetricDomain::Sleep,
          recorded_at: Utc::now(),
          payload:     serde_json::Value::Null,
        })
        .collect(),
    }
  }

  #[tokio::test]
  async fn score_grows_with_sessions_and_caps() {
    let engine = BaselineScoreEngine;
    let profile = UserProfile::new(Uuid::new_v4(), Utc::now());

    let one = engine
      .compute(ScoreKind::Sleep, &facts_with(1), &profile)
      .await
      .unwrap();
    let three = engine
      .compute(ScoreKind::Sleep, &facts_with(3), &profile)
      .await
      .unwrap();
    assert!(three > one);

    let many = engine
      .compute(ScoreKind::Sleep, &facts_with(20), &profile)
      .await
      .unwrap();
    assert_eq!(many, 100.0);
  }

  #[tokio::test]
  async fn generator_meets_target_and_avoids_disliked() {
    let generator = TemplatePlanGenerator;
    let profile = UserProfile::new(Uuid::new_v4(), Utc::now());

    let disliked = vec![DislikedOption {
      name:        DIET_TEMPLATES[0].to_owned(),
      recorded_at: Utc::now(),
    }];
    let batch = generator
      .generate(PlanDomain::Diet, &profile, &disliked)
      .await
      .unwrap();
    assert_eq!(batch.len(), PlanDomain::Diet.target_option_count());
    assert!(batch.iter().all(|o| o.name != DIET_TEMPLATES[0]));
  }

  #[tokio::test]
  async fn generator_never_returns_short_when_all_disliked() {
    let generator = TemplatePlanGenerator;
    let profile = UserProfile::new(Uuid::new_v4(), Utc::now());

    let disliked: Vec<DislikedOption> = EXERCISE_TEMPLATES
      .iter()
      .map(|name| DislikedOption {
        name:        (*name).to_owned(),
        recorded_at: Utc::now(),
      })
      .collect();
    let batch = generator
      .generate(PlanDomain::Exercise, &profile, &disliked)
      .await
      .unwrap();
    assert_eq!(batch.len(), PlanDomain::Exercise.target_option_count());
  }
}
