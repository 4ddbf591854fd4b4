//! The monthly rollup cache.

use chrono::Utc;
use pulse_core::{
  Result,
  clock::Clock,
  collab::ScoreEngine,
  facts::{FactScope, FactStore},
  metric::MetricDomain,
  rollup::{DaySummary, MonthlyRollup},
  store::HealthStore,
};
use uuid::Uuid;

use crate::{DailyMetricCache, store_err};

/// Read-through cache over per-month rollups.
///
/// Staleness policy:
/// - the current month (reference timezone) always rebuilds;
/// - a past month rebuilds when a fact newer than the cached rollup's
///   `last_updated` exists for the (month, domain);
/// - a missing rollup always rebuilds.
///
/// Rebuilds delegate score domains to the [`DailyMetricCache`], so a
/// month's per-day values can never disagree with the daily endpoint.
pub struct MonthlyMetricCache<S, F, E, C> {
  daily: DailyMetricCache<S, F, E, C>,
}

impl<S, F, E, C> MonthlyMetricCache<S, F, E, C>
where
  S: HealthStore,
  F: FactStore,
  E: ScoreEngine,
  C: Clock,
{
  pub fn new(daily: DailyMetricCache<S, F, E, C>) -> Self { Self { daily } }

  pub fn daily(&self) -> &DailyMetricCache<S, F, E, C> { &self.daily }

  pub async fn get_or_rebuild(
    &self,
    user_id: Uuid,
    year: i32,
    month: u32,
    domain: MetricDomain,
  ) -> Result<MonthlyRollup> {
    let cached = self
      .daily
      .store
      .get_monthly_rollup(user_id, year, month, domain)
      .await
      .map_err(Into::into)?;

    if let Some(rollup) = cached {
      if (year, month) != self.daily.clock.current_month()
        && self.is_fresh(user_id, year, month, domain, &rollup).await?
      {
        return Ok(rollup);
      }
    }

    self.rebuild(user_id, year, month, domain).await
  }

  /// A past month's rollup is fresh unless a fact newer than it exists.
  async fn is_fresh(
    &self,
    user_id: Uuid,
    year: i32,
    month: u32,
    domain: MetricDomain,
    rollup: &MonthlyRollup,
  ) -> Result<bool> {
    let latest = self
      .daily
      .facts
      .latest_fact_timestamp(user_id, FactScope::Month { year, month }, domain)
      .await
      .map_err(store_err)?;

    Ok(match latest {
      Some(ts) => ts <= rollup.last_updated,
      None => true,
    })
  }

  async fn rebuild(
    &self,
    user_id: Uuid,
    year: i32,
    month: u32,
    domain: MetricDomain,
  ) -> Result<MonthlyRollup> {
    let days = self
      .daily
      .store
      .month_days(year, month)
      .await
      .map_err(Into::into)?;

    tracing::debug!(%user_id, year, month, %domain, days = days.len(), "rebuilding monthly rollup");

    let mut summaries = Vec::with_capacity(days.len());
    for (day_id, date) in days {
      let value = match domain.score_kind() {
        Some(kind) => self
          .daily
          .get_or_compute(user_id, date, kind)
          .await?
          .value(),
        None => self
          .daily
          .store
          .get_or_create_daily(user_id, day_id)
          .await
          .map_err(Into::into)?
          .measurement(domain),
      };
      summaries.push(DaySummary { day_id, date, value });
    }

    // Wall-clock, not the injected clock: last_updated is compared against
    // store-assigned recorded_at timestamps, so both must share a source.
    let rollup = MonthlyRollup::build(domain, summaries, Utc::now());
    self
      .daily
      .store
      .put_monthly_rollup(user_id, year, month, &rollup)
      .await
      .map_err(Into::into)?;

    Ok(rollup)
  }
}
