//! Daily metric types — score kinds, measurement domains, and the per-day
//! cached record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── ScoreKind ───────────────────────────────────────────────────────────────

/// A computed score cached on the daily record. Each kind has its own
/// nullable column; NULL means "not yet computed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
  Activity,
  Sleep,
  Food,
  Metabolic,
}

impl ScoreKind {
  /// The discriminant string used in storage columns and URLs.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Activity => "activity",
      Self::Sleep => "sleep",
      Self::Food => "food",
      Self::Metabolic => "metabolic",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "activity" => Some(Self::Activity),
      "sleep" => Some(Self::Sleep),
      "food" => Some(Self::Food),
      "metabolic" => Some(Self::Metabolic),
      _ => None,
    }
  }

  /// The fact domain whose raw sessions feed this score.
  pub fn fact_domain(&self) -> MetricDomain {
    match self {
      Self::Activity => MetricDomain::Activity,
      Self::Sleep => MetricDomain::Sleep,
      Self::Food => MetricDomain::Food,
      Self::Metabolic => MetricDomain::Medication,
    }
  }

  /// Kinds that keep an append-only history of past computations.
  pub fn keeps_history(&self) -> bool { matches!(self, Self::Metabolic) }
}

impl std::fmt::Display for ScoreKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── MetricDomain ────────────────────────────────────────────────────────────

/// A tracked domain — the unit of fact storage and monthly rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDomain {
  Activity,
  Sleep,
  Food,
  Steps,
  Weight,
  HeartRate,
  Medication,
}

impl MetricDomain {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Activity => "activity",
      Self::Sleep => "sleep",
      Self::Food => "food",
      Self::Steps => "steps",
      Self::Weight => "weight",
      Self::HeartRate => "heart_rate",
      Self::Medication => "medication",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "activity" => Some(Self::Activity),
      "sleep" => Some(Self::Sleep),
      "food" => Some(Self::Food),
      "steps" => Some(Self::Steps),
      "weight" => Some(Self::Weight),
      "heart_rate" => Some(Self::HeartRate),
      "medication" => Some(Self::Medication),
      _ => None,
    }
  }

  /// The score kind a monthly rollup of this domain delegates to, if the
  /// domain is score-based rather than measurement-based.
  pub fn score_kind(&self) -> Option<ScoreKind> {
    match self {
      Self::Activity => Some(ScoreKind::Activity),
      Self::Sleep => Some(ScoreKind::Sleep),
      Self::Food => Some(ScoreKind::Food),
      _ => None,
    }
  }

  pub const ALL: [MetricDomain; 7] = [
    Self::Activity,
    Self::Sleep,
    Self::Food,
    Self::Steps,
    Self::Weight,
    Self::HeartRate,
    Self::Medication,
  ];
}

impl std::fmt::Display for MetricDomain {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── ScoreValue ──────────────────────────────────────────────────────────────

/// Outcome of a daily score lookup. `NoData` means no raw facts exist for
/// the date yet — a valid terminal state, distinct from "not yet computed"
/// and distinct from any error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreValue {
  Available { value: f64 },
  NoData,
}

impl ScoreValue {
  pub fn value(&self) -> Option<f64> {
    match self {
      Self::Available { value } => Some(*value),
      Self::NoData => None,
    }
  }
}

// ─── Samples ─────────────────────────────────────────────────────────────────

/// One entry of a score's append-only history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSample {
  pub recorded_at: DateTime<Utc>,
  pub value:       f64,
}

/// A single heart-rate reading attached to a day record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
  pub time: DateTime<Utc>,
  pub bpm:  f64,
}

// ─── DailyMetricRecord ───────────────────────────────────────────────────────

/// The cached per-(user, day) record. Created on first access with all
/// score fields NULL; mutated by the scoring flow and by raw-fact ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyMetricRecord {
  pub user_id: Uuid,
  pub day_id:  Uuid,

  pub activity_score:  Option<f64>,
  pub sleep_score:     Option<f64>,
  pub food_score:      Option<f64>,
  pub metabolic_score: Option<f64>,

  /// Append-only history of past metabolic score computations.
  pub metabolic_score_history: Vec<ScoreSample>,

  // Raw aggregates consumed by downstream scoring.
  pub total_energy_burned: Option<f64>,
  pub total_steps:         Option<i64>,
  pub distance_covered_m:  Option<f64>,
  pub weight_kg:           Option<f64>,

  pub resting_heart_rate: Option<f64>,
  pub max_heart_rate:     Option<f64>,
  pub min_heart_rate:     Option<f64>,
  /// Intraday readings, merged by timestamp on ingestion.
  pub heart_rate_samples: Vec<HeartRateSample>,

  /// Fraction of scheduled medication doses taken, 0.0–1.0.
  pub medication_adherence: Option<f64>,

  pub created_at: DateTime<Utc>,
  /// Store-assigned on every mutation; the record's staleness anchor.
  pub updated_at: DateTime<Utc>,
}

impl DailyMetricRecord {
  /// A fresh record with default (uncomputed) values.
  pub fn new(user_id: Uuid, day_id: Uuid, now: DateTime<Utc>) -> Self {
    Self {
      user_id,
      day_id,
      activity_score: None,
      sleep_score: None,
      food_score: None,
      metabolic_score: None,
      metabolic_score_history: Vec::new(),
      total_energy_burned: None,
      total_steps: None,
      distance_covered_m: None,
      weight_kg: None,
      resting_heart_rate: None,
      max_heart_rate: None,
      min_heart_rate: None,
      heart_rate_samples: Vec::new(),
      medication_adherence: None,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn score(&self, kind: ScoreKind) -> Option<f64> {
    match kind {
      ScoreKind::Activity => self.activity_score,
      ScoreKind::Sleep => self.sleep_score,
      ScoreKind::Food => self.food_score,
      ScoreKind::Metabolic => self.metabolic_score,
    }
  }

  /// The raw per-day value a measurement-domain rollup reads.
  /// Returns `None` for score-based domains; those go through the cache.
  pub fn measurement(&self, domain: MetricDomain) -> Option<f64> {
    match domain {
      MetricDomain::Steps => self.total_steps.map(|s| s as f64),
      MetricDomain::Weight => self.weight_kg,
      MetricDomain::HeartRate => self.resting_heart_rate,
      MetricDomain::Medication => self.medication_adherence,
      MetricDomain::Activity | MetricDomain::Sleep | MetricDomain::Food => None,
    }
  }
}

/// Partial update applied to a day record by ingestion flows. Only `Some`
/// fields are written; the rest are left as stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MeasurementUpdate {
  pub total_energy_burned:  Option<f64>,
  pub total_steps:          Option<i64>,
  pub distance_covered_m:   Option<f64>,
  pub weight_kg:            Option<f64>,
  pub resting_heart_rate:   Option<f64>,
  pub max_heart_rate:       Option<f64>,
  pub min_heart_rate:       Option<f64>,
  pub medication_adherence: Option<f64>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn score_kind_roundtrips_through_str() {
    for kind in [ScoreKind::Activity, ScoreKind::Sleep, ScoreKind::Food, ScoreKind::Metabolic] {
      assert_eq!(ScoreKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(ScoreKind::parse("bogus"), None);
  }

  #[test]
  fn metric_domain_roundtrips_through_str() {
    for domain in MetricDomain::ALL {
      assert_eq!(MetricDomain::parse(domain.as_str()), Some(domain));
    }
  }

  #[test]
  fn measurement_is_none_for_score_domains() {
    let record =
      DailyMetricRecord::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
    assert_eq!(record.measurement(MetricDomain::Sleep), None);
    assert_eq!(record.measurement(MetricDomain::Steps), None);
  }

  #[test]
  fn steps_measurement_widens_to_f64() {
    let mut record =
      DailyMetricRecord::new(Uuid::new_v4(), Uuid::new_v4(), Utc::now());
    record.total_steps = Some(8421);
    assert_eq!(record.measurement(MetricDomain::Steps), Some(8421.0));
  }
}
