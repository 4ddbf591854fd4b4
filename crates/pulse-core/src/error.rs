//! Error taxonomy for the Pulse subsystem.
//!
//! "No facts for this date" is deliberately *not* an error — it is the
//! [`ScoreValue::NoData`](crate::metric::ScoreValue) terminal state. The
//! variants here all mean an operation could not complete.

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::{metric::ScoreKind, plan::PlanDomain};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The day-key chain could not be resolved even after a retry. Safe for
  /// the caller to retry; never proceed with a synthesised key.
  #[error("could not resolve temporal key for {year:04}-{month:02}-{day:02}")]
  TemporalResolution { year: i32, month: u32, day: u32 },

  #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
  InvalidDate(String),

  #[error("user profile not found: {0}")]
  ProfileNotFound(Uuid),

  #[error("no {domain} plan exists for user {user_id} on {date}")]
  PlanNotFound {
    user_id: Uuid,
    date:    NaiveDate,
    domain:  PlanDomain,
  },

  /// A stored plan with an empty option list. Generation must always leave
  /// at least one option, so this indicates corruption, not absence.
  #[error("{domain} plan for user {user_id} on {date} has no options")]
  EmptyPlan {
    user_id: Uuid,
    date:    NaiveDate,
    domain:  PlanDomain,
  },

  /// The scoring collaborator failed. The prior cached value is untouched.
  #[error("scoring failed for {kind}")]
  Scoring {
    kind:   ScoreKind,
    #[source]
    source: BoxError,
  },

  /// The generation collaborator failed. The stored plan is untouched.
  #[error("plan generation failed for {domain}")]
  Generation {
    domain: PlanDomain,
    #[source]
    source: BoxError,
  },

  #[error("store error")]
  Store(#[source] BoxError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Whether the caller may simply retry the same call. Collaborator
  /// outages and key-chain races are transient; the rest are not.
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      Self::TemporalResolution { .. } | Self::Scoring { .. } | Self::Generation { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
