//! Raw-fact types and the [`FactStore`] read contract.
//!
//! The caches never inspect fact payloads; they only ask "what is the most
//! recent fact timestamp?" (staleness) and "give me everything for this
//! day" (recomputation input). Both reads return empty rather than erroring
//! when nothing exists.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::metric::MetricDomain;

// ─── Sessions ────────────────────────────────────────────────────────────────

/// One ingested raw-fact session (an activity session, a night of sleep, a
/// logged meal, a medication update). `recorded_at` is server-assigned at
/// ingestion time — it is the staleness anchor, deliberately independent of
/// the calendar day the session describes, so backfilled data still reads
/// as "new".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactSession {
  pub session_id:  Uuid,
  pub user_id:     Uuid,
  pub day_id:      Uuid,
  pub domain:      MetricDomain,
  pub recorded_at: DateTime<Utc>,
  pub payload:     serde_json::Value,
}

/// Input to [`crate::store::HealthStore::record_session`].
/// The store stamps `recorded_at` itself; callers cannot supply one.
#[derive(Debug, Clone)]
pub struct NewFactSession {
  pub user_id: Uuid,
  pub date:    NaiveDate,
  pub domain:  MetricDomain,
  pub payload: serde_json::Value,
}

/// Everything the scoring collaborator gets to see for one (user, day,
/// domain). Any time-of-day dependence must live in the sessions, not in
/// the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactSet {
  pub domain:   MetricDomain,
  pub sessions: Vec<FactSession>,
}

impl FactSet {
  pub fn empty(domain: MetricDomain) -> Self { Self { domain, sessions: Vec::new() } }

  pub fn is_empty(&self) -> bool { self.sessions.is_empty() }
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// The granularity of a latest-timestamp query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactScope {
  Day(Uuid),
  Month { year: i32, month: u32 },
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only adapter over the raw-fact tables.
///
/// Implementations must return `None`/empty rather than erroring when no
/// facts exist; an error here means the store itself failed.
pub trait FactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The most recent `recorded_at` among the user's facts in `scope` for
  /// `domain`, or `None` if there are no such facts.
  fn latest_fact_timestamp(
    &self,
    user_id: Uuid,
    scope: FactScope,
    domain: MetricDomain,
  ) -> impl Future<Output = Result<Option<DateTime<Utc>>, Self::Error>> + Send + '_;

  /// All raw facts for one (user, day, domain).
  fn raw_facts(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    domain: MetricDomain,
  ) -> impl Future<Output = Result<FactSet, Self::Error>> + Send + '_;
}
