//! The [`HealthStore`] trait — the storage contract for temporal keys,
//! cached records, plans, and profiles.
//!
//! The trait is implemented by storage backends (e.g. `pulse-store-sqlite`).
//! The cache, plan, and scheduler components depend on this abstraction,
//! not on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  facts::{FactSession, NewFactSession},
  metric::{DailyMetricRecord, HeartRateSample, MeasurementUpdate, MetricDomain, ScoreKind},
  plan::{PlanDomain, PlanOption, PlanRecord},
  profile::UserProfile,
  rollup::MonthlyRollup,
};

pub trait HealthStore: Send + Sync {
  /// Backend error. Must convert into the shared taxonomy so callers can
  /// distinguish a temporal-resolution failure from a plain store fault.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Temporal keys ─────────────────────────────────────────────────────

  /// Resolve `date` to its stable `day_id`, creating the Year → Month →
  /// Day chain if needed. Idempotent; safe under concurrent callers racing
  /// to create the same date. Must never return a synthesised key: if the
  /// chain cannot be resolved after a bounded retry, this fails.
  fn resolve_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Uuid, Self::Error>> + Send + '_;

  /// Reverse lookup. `None` if the key was never created.
  fn day_date(
    &self,
    day_id: Uuid,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;

  /// Every day key that exists for the month, via the ancestor chain —
  /// no scan over all day records.
  fn month_days(
    &self,
    year: i32,
    month: u32,
  ) -> impl Future<Output = Result<Vec<(Uuid, NaiveDate)>, Self::Error>> + Send + '_;

  // ── Daily records ─────────────────────────────────────────────────────

  fn get_or_create_daily(
    &self,
    user_id: Uuid,
    day_id: Uuid,
  ) -> impl Future<Output = Result<DailyMetricRecord, Self::Error>> + Send + '_;

  /// Persist a freshly computed score, appending to its history array if
  /// the kind keeps one. Last write wins under concurrent recomputation.
  fn set_daily_score(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    kind: ScoreKind,
    value: f64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Apply a partial measurement update from an ingestion flow.
  fn update_daily_measurements(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    update: MeasurementUpdate,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Merge intraday heart-rate readings by timestamp; existing times are
  /// never duplicated or overwritten.
  fn ingest_heart_samples(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    samples: Vec<HeartRateSample>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Monthly rollups ───────────────────────────────────────────────────

  fn get_monthly_rollup(
    &self,
    user_id: Uuid,
    year: i32,
    month: u32,
    domain: MetricDomain,
  ) -> impl Future<Output = Result<Option<MonthlyRollup>, Self::Error>> + Send + '_;

  fn put_monthly_rollup<'a>(
    &'a self,
    user_id: Uuid,
    year: i32,
    month: u32,
    rollup: &'a MonthlyRollup,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Plans ─────────────────────────────────────────────────────────────

  fn get_plan(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    domain: PlanDomain,
  ) -> impl Future<Output = Result<Option<PlanRecord>, Self::Error>> + Send + '_;

  /// Upsert the full option list for (user, day, domain).
  fn put_plan(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    domain: PlanDomain,
    options: Vec<PlanOption>,
  ) -> impl Future<Output = Result<PlanRecord, Self::Error>> + Send + '_;

  /// Returns whether a plan existed.
  fn delete_plan(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    domain: PlanDomain,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Every date the user has a stored plan for in `domain`, unordered.
  fn plan_dates(
    &self,
    user_id: Uuid,
    domain: PlanDomain,
  ) -> impl Future<Output = Result<Vec<NaiveDate>, Self::Error>> + Send + '_;

  // ── Fact ingestion ────────────────────────────────────────────────────

  /// Persist a raw-fact session (`recorded_at` store-assigned) and clear
  /// the affected day's cached score for the session's domain so the next
  /// read recomputes against the new data.
  fn record_session(
    &self,
    input: NewFactSession,
  ) -> impl Future<Output = Result<FactSession, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn create_profile<'a>(
    &'a self,
    profile: &'a UserProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<UserProfile>, Self::Error>> + Send + '_;

  /// Full-record update keyed by `profile.user_id`.
  fn update_profile<'a>(
    &'a self,
    profile: &'a UserProfile,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All known user ids; drives the scheduler sweep.
  fn list_users(&self)
  -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;
}
