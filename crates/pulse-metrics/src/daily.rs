//! The daily score cache.

use chrono::NaiveDate;
use pulse_core::{
  Error, Result,
  clock::Clock,
  collab::ScoreEngine,
  facts::FactStore,
  metric::{ScoreKind, ScoreValue},
  store::HealthStore,
};
use uuid::Uuid;

use crate::store_err;

/// Read-through cache over per-day scores.
///
/// A cached score is authoritative for any past (or future) date; for
/// "today" in the reference timezone it is treated as provisional and
/// always recomputed, since more facts may still arrive for the day.
pub struct DailyMetricCache<S, F, E, C> {
  pub(crate) store:  S,
  pub(crate) facts:  F,
  pub(crate) engine: E,
  pub(crate) clock:  C,
}

impl<S, F, E, C> DailyMetricCache<S, F, E, C>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  C: Clock,
{
  pub fn new(store: S, facts: F, engine: E, clock: C) -> Self {
    Self { store, facts, engine, clock }
  }

  /// Serve the score for (user, date, kind), recomputing if needed.
  ///
  /// Returns [`ScoreValue::NoData`] when the user has no raw facts for the
  /// day — that is an answer, not an error. A scoring failure propagates
  /// and leaves whatever was cached before untouched.
  pub async fn get_or_compute(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    kind: ScoreKind,
  ) -> Result<ScoreValue> {
    let day_id = self.store.resolve_day(date).await.map_err(Into::into)?;
    let record = self
      .store
      .get_or_create_daily(user_id, day_id)
      .await
      .map_err(Into::into)?;

    if let Some(value) = record.score(kind) {
      if date != self.clock.today() {
        return Ok(ScoreValue::Available { value });
      }
    }

    let facts = self
      .facts
      .raw_facts(user_id, day_id, kind.fact_domain())
      .await
      .map_err(store_err)?;
    if facts.is_empty() {
      return Ok(ScoreValue::NoData);
    }

    let profile = self
      .store
      .get_profile(user_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::ProfileNotFound(user_id))?;

    let value = self
      .engine
      .compute(kind, &facts, &profile)
      .await
      .map_err(|e| Error::Scoring { kind, source: Box::new(e) })?;

    tracing::debug!(%user_id, %date, %kind, value, "recomputed daily score");

    self
      .store
      .set_daily_score(user_id, day_id, kind, value)
      .await
      .map_err(Into::into)?;

    Ok(ScoreValue::Available { value })
  }
}
