//! Monthly rollup types.
//!
//! A rollup is a structured object: a per-day breakdown (order-irrelevant)
//! plus typed summary statistics, stamped with the time it was built. One
//! rollup is cached per (user, year, month, domain).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metric::MetricDomain;

/// One day's contribution to a monthly rollup. `value` is `None` when the
/// day exists but has nothing for the domain (no score, no measurement).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
  pub day_id: Uuid,
  pub date:   NaiveDate,
  pub value:  Option<f64>,
}

/// Summary statistics over the non-null day values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollupSummary {
  /// Days present in the month's key chain.
  pub total_days:   u32,
  /// Days that contributed a non-null value.
  pub counted_days: u32,
  pub average:      Option<f64>,
  /// Sum of values; only meaningful for additive domains (steps).
  pub total:        Option<f64>,
  pub min:          Option<f64>,
  pub max:          Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRollup {
  pub domain:       MetricDomain,
  pub days:         Vec<DaySummary>,
  pub summary:      RollupSummary,
  /// When this rollup was built; compared against the domain's latest
  /// raw-fact timestamp to decide staleness for past months.
  pub last_updated: DateTime<Utc>,
}

impl MonthlyRollup {
  /// Build a rollup from per-day values, computing the summary statistics.
  pub fn build(domain: MetricDomain, days: Vec<DaySummary>, now: DateTime<Utc>) -> Self {
    let values: Vec<f64> = days.iter().filter_map(|d| d.value).collect();
    let counted = values.len() as u32;
    let sum: f64 = values.iter().sum();

    let summary = RollupSummary {
      total_days:   days.len() as u32,
      counted_days: counted,
      average:      (counted > 0).then(|| sum / f64::from(counted)),
      total:        additive(domain).then_some(sum),
      min:          values.iter().copied().reduce(f64::min),
      max:          values.iter().copied().reduce(f64::max),
    };

    Self { domain, days, summary, last_updated: now }
  }
}

/// Whether summing day values is meaningful for the domain.
fn additive(domain: MetricDomain) -> bool {
  matches!(domain, MetricDomain::Steps)
}
