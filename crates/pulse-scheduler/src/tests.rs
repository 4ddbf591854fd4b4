//! Window-invariant tests with a fixed clock and an in-memory store.

use chrono::{NaiveDate, Utc};
use pulse_core::{
  clock::FixedClock,
  collab::PlanGenerator,
  plan::{DislikedOption, PlanDomain, PlanOption},
  profile::UserProfile,
  store::HealthStore,
};
use pulse_plan::PlanService;
use pulse_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{Scheduler, WINDOW_DAYS};

struct StubGenerator;

impl PlanGenerator for StubGenerator {
  type Error = std::io::Error;

  async fn generate(
    &self,
    domain: PlanDomain,
    _profile: &UserProfile,
    _disliked: &[DislikedOption],
  ) -> Result<Vec<PlanOption>, Self::Error> {
    Ok(
      (1..=domain.target_option_count())
        .map(|m| PlanOption::named(format!("{domain}-opt{m}")))
        .collect(),
    )
  }
}

fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn scheduler_on(
  today: &str,
) -> Scheduler<SqliteStore, StubGenerator, FixedClock> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let plans = PlanService::new(store.clone(), StubGenerator);
  Scheduler::new(store, plans, FixedClock::on(date(today)), 12)
}

async fn add_user(sched: &Scheduler<SqliteStore, StubGenerator, FixedClock>) -> Uuid {
  let user = Uuid::new_v4();
  sched
    .store
    .create_profile(&UserProfile::new(user, Utc::now()))
    .await
    .unwrap();
  user
}

/// The user's stored plan dates for `domain`, sorted.
async fn stored_dates(
  sched: &Scheduler<SqliteStore, StubGenerator, FixedClock>,
  user: Uuid,
  domain: PlanDomain,
) -> Vec<NaiveDate> {
  let mut dates = sched.store.plan_dates(user, domain).await.unwrap();
  dates.sort();
  dates
}

#[tokio::test]
async fn sweep_fills_the_window_for_both_domains() {
  let sched = scheduler_on("2024-06-10").await;
  let user = add_user(&sched).await;

  let report = sched.run_daily_sweep().await;
  assert!(!report.skipped);
  assert_eq!(report.users_processed, 1);
  assert_eq!(report.plans_generated, WINDOW_DAYS as usize * 2);
  assert_eq!(report.plans_expired, 0);
  assert_eq!(report.failures, 0);

  for domain in PlanDomain::ALL {
    let dates = stored_dates(&sched, user, domain).await;
    assert_eq!(dates.first(), Some(&date("2024-06-10")));
    assert_eq!(dates.last(), Some(&date("2024-06-16")));
    assert_eq!(dates.len(), WINDOW_DAYS as usize);
  }
}

#[tokio::test]
async fn next_day_sweep_slides_the_window() {
  let sched = scheduler_on("2024-06-10").await;
  let user = add_user(&sched).await;
  sched.run_daily_sweep().await;

  sched.clock.advance_days(1);
  let report = sched.run_daily_sweep().await;
  // One new trailing date and one expired leading date per domain.
  assert_eq!(report.plans_generated, 2);
  assert_eq!(report.plans_expired, 2);

  let dates = stored_dates(&sched, user, PlanDomain::Diet).await;
  assert_eq!(dates.first(), Some(&date("2024-06-11")));
  assert_eq!(dates.last(), Some(&date("2024-06-17")));
  assert_eq!(dates.len(), WINDOW_DAYS as usize);
}

#[tokio::test]
async fn startup_reconcile_heals_a_downtime_gap() {
  let sched = scheduler_on("2024-06-10").await;
  let user = add_user(&sched).await;
  sched.run_daily_sweep().await;

  // Three days of downtime: the window has three holes and three
  // expired leading dates per domain.
  sched.clock.advance_days(3);
  let report = sched.run_startup_reconcile().await;
  assert_eq!(report.plans_generated, 6);
  assert_eq!(report.plans_expired, 6);

  let dates = stored_dates(&sched, user, PlanDomain::Exercise).await;
  assert_eq!(dates.first(), Some(&date("2024-06-13")));
  assert_eq!(dates.last(), Some(&date("2024-06-19")));
  assert_eq!(dates.len(), WINDOW_DAYS as usize);

  // Running it again changes nothing.
  let again = sched.run_startup_reconcile().await;
  assert_eq!(again.plans_generated, 0);
  assert_eq!(again.plans_expired, 0);
}

/// Fails for any profile carrying the "broken" goal marker.
struct FlakyGenerator;

impl PlanGenerator for FlakyGenerator {
  type Error = std::io::Error;

  async fn generate(
    &self,
    domain: PlanDomain,
    profile: &UserProfile,
    _disliked: &[DislikedOption],
  ) -> Result<Vec<PlanOption>, Self::Error> {
    if profile.health_goals.iter().any(|g| g == "broken") {
      return Err(std::io::Error::other("generation refused"));
    }
    Ok(vec![PlanOption::named(format!("{domain}-opt1"))])
  }
}

#[tokio::test]
async fn one_failing_user_does_not_abort_the_sweep() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let plans = PlanService::new(store.clone(), FlakyGenerator);
  let sched = Scheduler::new(store, plans, FixedClock::on(date("2024-06-10")), 12);

  let healthy = Uuid::new_v4();
  sched
    .store
    .create_profile(&UserProfile::new(healthy, Utc::now()))
    .await
    .unwrap();

  let mut broken = UserProfile::new(Uuid::new_v4(), Utc::now());
  broken.health_goals = vec!["broken".into()];
  sched.store.create_profile(&broken).await.unwrap();

  let report = sched.run_daily_sweep().await;
  assert_eq!(report.users_processed, 1);
  assert_eq!(report.failures, 1);

  let mut dates = sched
    .store
    .plan_dates(healthy, PlanDomain::Diet)
    .await
    .unwrap();
  dates.sort();
  assert_eq!(dates.len(), WINDOW_DAYS as usize);
}

#[tokio::test]
async fn overlapping_trigger_is_skipped() {
  let sched = scheduler_on("2024-06-10").await;
  add_user(&sched).await;

  let guard = sched.sweep_lock.lock().await;
  let report = sched.run_daily_sweep().await;
  assert!(report.skipped);
  assert_eq!(report.users_processed, 0);
  drop(guard);

  let report = sched.run_daily_sweep().await;
  assert!(!report.skipped);
  assert_eq!(report.users_processed, 1);
}
