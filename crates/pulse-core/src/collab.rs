//! External collaborator contracts: scoring and plan generation.
//!
//! Both are opaque to this subsystem. Failures propagate to the caller of
//! the single operation that needed them; nothing here is retried
//! internally, and a failure never corrupts previously cached state.

use std::future::Future;

use crate::{
  facts::FactSet,
  metric::ScoreKind,
  plan::{DislikedOption, PlanDomain, PlanOption},
  profile::UserProfile,
};

/// Computes a score from raw facts and the user's profile.
///
/// Must be a pure function of its inputs: any time-of-day dependence
/// belongs in the [`FactSet`], not hidden inside the implementation.
pub trait ScoreEngine: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn compute<'a>(
    &'a self,
    kind: ScoreKind,
    facts: &'a FactSet,
    profile: &'a UserProfile,
  ) -> impl Future<Output = Result<f64, Self::Error>> + Send + 'a;
}

/// Produces a fresh ranked option batch for a plan domain.
///
/// The returned list must contain at least
/// [`PlanDomain::target_option_count`] options; `disliked` biases the
/// generator away from recently rejected options.
pub trait PlanGenerator: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn generate<'a>(
    &'a self,
    domain: PlanDomain,
    profile: &'a UserProfile,
    disliked: &'a [DislikedOption],
  ) -> impl Future<Output = Result<Vec<PlanOption>, Self::Error>> + Send + 'a;
}
