//! Plan storage and option rotation.
//!
//! A plan is a ranked list of options for one (user, date, domain) — the
//! front option is "the plan", the rest are standby alternatives. Rejecting
//! the front rotates it to the back while at least two options remain;
//! only when the list would run dry does the external generator get
//! involved. A rejected plan is never lost: it goes to the back of the
//! list (or the back of a fresh batch), so the list never empties.

use chrono::{NaiveDate, Utc};
use pulse_core::{
  Error, Result,
  collab::PlanGenerator,
  plan::{DislikedOption, PlanDomain, PlanOption, PlanRecord},
  profile::UserProfile,
  store::HealthStore,
};
use uuid::Uuid;

/// Plan operations over a storage backend and a generation collaborator.
pub struct PlanService<S, G> {
  store:     S,
  generator: G,
}

impl<S, G> PlanService<S, G>
where
  S: HealthStore,
  G: PlanGenerator,
{
  pub fn new(store: S, generator: G) -> Self { Self { store, generator } }

  /// Fetch the plan for (user, date, domain), generating and persisting a
  /// fresh batch if none is stored yet.
  pub async fn get_or_generate(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    domain: PlanDomain,
  ) -> Result<PlanRecord> {
    let day_id = self.store.resolve_day(date).await.map_err(Into::into)?;

    if let Some(plan) = self
      .store
      .get_plan(user_id, day_id, domain)
      .await
      .map_err(Into::into)?
    {
      return Ok(plan);
    }

    let profile = self.profile(user_id).await?;
    let options = self.generate(domain, &profile).await?;

    tracing::debug!(%user_id, %date, %domain, options = options.len(), "generated plan");

    self
      .store
      .put_plan(user_id, day_id, domain, options)
      .await
      .map_err(Into::into)
  }

  /// Reject the current front option and return its replacement.
  ///
  /// The rejected option is logged into the profile's disliked history
  /// (bounded, oldest evicted) and moved to the back of the list. When
  /// fewer than two options remain, a fresh batch is generated first and
  /// the rejected option is appended behind it.
  pub async fn regenerate(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    domain: PlanDomain,
  ) -> Result<PlanOption> {
    let day_id = self.store.resolve_day(date).await.map_err(Into::into)?;

    let plan = self
      .store
      .get_plan(user_id, day_id, domain)
      .await
      .map_err(Into::into)?
      .ok_or(Error::PlanNotFound { user_id, date, domain })?;

    let mut options = plan.options;
    if options.is_empty() {
      return Err(Error::EmptyPlan { user_id, date, domain });
    }

    let mut profile = self.profile(user_id).await?;
    profile.push_disliked(domain, DislikedOption {
      name:        options[0].name.clone(),
      recorded_at: Utc::now(),
    });
    self
      .store
      .update_profile(&profile)
      .await
      .map_err(Into::into)?;

    if options.len() >= 2 {
      // Enough standby options: rotate, no external call.
      options.rotate_left(1);
    } else {
      let rejected = options.remove(0);
      options = self.generate(domain, &profile).await?;
      options.push(rejected);
    }

    let stored = self
      .store
      .put_plan(user_id, day_id, domain, options)
      .await
      .map_err(Into::into)?;

    // put_plan round-trips the list we just built, which is never empty.
    stored
      .options
      .into_iter()
      .next()
      .ok_or(Error::EmptyPlan { user_id, date, domain })
  }

  /// Returns whether a plan existed.
  pub async fn delete(
    &self,
    user_id: Uuid,
    date: NaiveDate,
    domain: PlanDomain,
  ) -> Result<bool> {
    let day_id = self.store.resolve_day(date).await.map_err(Into::into)?;
    self
      .store
      .delete_plan(user_id, day_id, domain)
      .await
      .map_err(Into::into)
  }

  /// The subset of `dates` the user has no stored plan for.
  pub async fn missing_dates(
    &self,
    user_id: Uuid,
    dates: &[NaiveDate],
    domain: PlanDomain,
  ) -> Result<Vec<NaiveDate>> {
    let existing = self
      .store
      .plan_dates(user_id, domain)
      .await
      .map_err(Into::into)?;
    Ok(
      dates
        .iter()
        .copied()
        .filter(|d| !existing.contains(d))
        .collect(),
    )
  }

  /// Every stored plan date strictly before `cutoff`.
  pub async fn dates_before(
    &self,
    user_id: Uuid,
    cutoff: NaiveDate,
    domain: PlanDomain,
  ) -> Result<Vec<NaiveDate>> {
    let existing = self
      .store
      .plan_dates(user_id, domain)
      .await
      .map_err(Into::into)?;
    Ok(existing.into_iter().filter(|d| *d < cutoff).collect())
  }

  async fn profile(&self, user_id: Uuid) -> Result<UserProfile> {
    self
      .store
      .get_profile(user_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::ProfileNotFound(user_id))
  }

  /// Call the generator and enforce its batch contract.
  async fn generate(
    &self,
    domain: PlanDomain,
    profile: &UserProfile,
  ) -> Result<Vec<PlanOption>> {
    let options = self
      .generator
      .generate(domain, profile, profile.disliked(domain))
      .await
      .map_err(|e| Error::Generation { domain, source: Box::new(e) })?;

    if options.is_empty() {
      return Err(Error::Generation {
        domain,
        source: "generator returned an empty batch".into(),
      });
    }
    if options.len() < domain.target_option_count() {
      tracing::warn!(
        %domain,
        got = options.len(),
        want = domain.target_option_count(),
        "generator returned a short batch"
      );
    }

    Ok(options)
  }
}
