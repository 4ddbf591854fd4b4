//! The sliding-window plan scheduler.
//!
//! Maintains, for every user and both plan domains, exactly one plan per
//! date in the seven-day window `[today, today + 6]` and none earlier.
//! One restoration step expresses that invariant directly — generate
//! whatever is missing in the window, delete whatever is dated before
//! today — and both triggers (the daily sweep and the startup reconcile)
//! run the same step, so downtime gaps of any length self-heal without
//! touching dates that already have plans.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use pulse_core::{
  Result, clock::Clock, collab::PlanGenerator, plan::PlanDomain, store::HealthStore,
};
use pulse_plan::PlanService;
use tokio::sync::Mutex;
use uuid::Uuid;

pub use pulse_core::plan::PLAN_WINDOW_DAYS as WINDOW_DAYS;

// ─── SweepReport ─────────────────────────────────────────────────────────────

/// Outcome counts of one sweep, for logging and alerting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
  pub users_processed: usize,
  pub plans_generated: usize,
  pub plans_expired:   usize,
  /// Users whose restoration step failed; the sweep continued past them.
  pub failures:        usize,
  /// A sweep was already running, so this trigger did nothing.
  pub skipped:         bool,
}

/// What one user's restoration step changed.
#[derive(Debug, Clone, Copy, Default)]
struct UserOutcome {
  generated: usize,
  expired:   usize,
}

// ─── Scheduler ───────────────────────────────────────────────────────────────

pub struct Scheduler<S, G, C> {
  store:      S,
  plans:      PlanService<S, G>,
  clock:      C,
  /// Held for the duration of a sweep; `try_lock` makes overlap a skip.
  sweep_lock: Mutex<()>,
  /// Hour of day (reference timezone) the daily sweep fires at.
  fire_hour:  u32,
}

impl<S, G, C> Scheduler<S, G, C>
where
  S: HealthStore,
  G: PlanGenerator,
  C: Clock,
{
  pub fn new(store: S, plans: PlanService<S, G>, clock: C, fire_hour: u32) -> Self {
    Self {
      store,
      plans,
      clock,
      sweep_lock: Mutex::new(()),
      fire_hour,
    }
  }

  /// The dates a user should currently hold plans for.
  fn window(&self) -> Vec<NaiveDate> {
    let today = self.clock.today();
    (0..WINDOW_DAYS).map(|d| today + Duration::days(d)).collect()
  }

  /// Restore one user to the window invariant: fill every hole in
  /// `[today, today + 6]`, drop everything dated before today.
  async fn restore_window(&self, user_id: Uuid) -> Result<UserOutcome> {
    let today = self.clock.today();
    let window = self.window();
    let mut outcome = UserOutcome::default();

    for domain in PlanDomain::ALL {
      for date in self
        .plans
        .missing_dates(user_id, &window, domain)
        .await?
      {
        self.plans.get_or_generate(user_id, date, domain).await?;
        outcome.generated += 1;
      }

      for date in self.plans.dates_before(user_id, today, domain).await? {
        if self.plans.delete(user_id, date, domain).await? {
          outcome.expired += 1;
        }
      }
    }

    Ok(outcome)
  }

  /// Walk all users and apply the restoration step to each. Per-user
  /// failures are logged and counted; they never abort the sweep.
  async fn sweep(&self) -> SweepReport {
    let mut report = SweepReport::default();

    let users = match self.store.list_users().await {
      Ok(users) => users,
      Err(e) => {
        let e: pulse_core::Error = e.into();
        tracing::error!(error = %e, "sweep could not list users");
        report.failures = 1;
        return report;
      }
    };

    for user_id in users {
      match self.restore_window(user_id).await {
        Ok(outcome) => {
          report.users_processed += 1;
          report.plans_generated += outcome.generated;
          report.plans_expired += outcome.expired;
        }
        Err(e) => {
          tracing::error!(%user_id, error = %e, "restoration step failed");
          report.failures += 1;
        }
      }
    }

    tracing::info!(
      users = report.users_processed,
      generated = report.plans_generated,
      expired = report.plans_expired,
      failures = report.failures,
      "sweep complete"
    );
    report
  }

  /// The daily trigger. Skips (and says so) if a sweep is already running.
  pub async fn run_daily_sweep(&self) -> SweepReport {
    let Ok(_guard) = self.sweep_lock.try_lock() else {
      tracing::warn!("sweep already running, skipping this trigger");
      return SweepReport { skipped: true, ..SweepReport::default() };
    };
    self.sweep().await
  }

  /// The startup trigger: waits for any in-flight sweep instead of
  /// skipping, then runs the same restoration step.
  pub async fn run_startup_reconcile(&self) -> SweepReport {
    let _guard = self.sweep_lock.lock().await;
    self.sweep().await
  }

  /// Time until the next daily fire, from the reference-timezone clock.
  fn until_next_fire(&self) -> std::time::Duration {
    let now = self.clock.now();
    let fire_time =
      NaiveTime::from_hms_opt(self.fire_hour, 0, 0).unwrap_or(NaiveTime::MIN);
    let mut next = now.date_naive().and_time(fire_time);
    if next <= now.naive_local() {
      next += Duration::days(1);
    }
    (next - now.naive_local()).to_std().unwrap_or_default()
  }
}

impl<S, G, C> Scheduler<S, G, C>
where
  S: HealthStore + 'static,
  G: PlanGenerator + 'static,
  C: Clock + 'static,
{
  /// Run the daily trigger loop as a background task.
  pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
      loop {
        let wait = self.until_next_fire();
        tracing::debug!(seconds = wait.as_secs(), "sleeping until next sweep");
        tokio::time::sleep(wait).await;
        self.run_daily_sweep().await;
      }
    })
  }
}

#[cfg(test)]
mod tests;
