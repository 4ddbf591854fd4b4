//! `SqliteStore` integration tests over an in-memory database.

use chrono::NaiveDate;
use pulse_core::{
  facts::{FactScope, FactStore, NewFactSession},
  metric::{HeartRateSample, MeasurementUpdate, MetricDomain, ScoreKind},
  plan::{PlanDomain, PlanOption},
  profile::UserProfile,
  rollup::{DaySummary, MonthlyRollup},
  store::HealthStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn option_named(name: &str) -> PlanOption { PlanOption::named(name) }

// ─── Temporal keys ───────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_day_is_stable() {
  let s = store().await;
  let d = date("2024-06-10");

  let first = s.resolve_day(d).await.unwrap();
  let second = s.resolve_day(d).await.unwrap();
  assert_eq!(first, second);
}

#[tokio::test]
async fn resolve_day_distinct_dates_distinct_keys() {
  let s = store().await;

  let a = s.resolve_day(date("2024-06-10")).await.unwrap();
  let b = s.resolve_day(date("2024-06-11")).await.unwrap();
  let c = s.resolve_day(date("2025-06-10")).await.unwrap();
  assert_ne!(a, b);
  assert_ne!(a, c);
}

#[tokio::test]
async fn day_date_round_trips() {
  let s = store().await;
  let d = date("2024-02-29");

  let id = s.resolve_day(d).await.unwrap();
  assert_eq!(s.day_date(id).await.unwrap(), Some(d));
}

#[tokio::test]
async fn day_date_missing_returns_none() {
  let s = store().await;
  assert_eq!(s.day_date(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn month_days_lists_only_created_days() {
  let s = store().await;
  s.resolve_day(date("2024-06-03")).await.unwrap();
  s.resolve_day(date("2024-06-17")).await.unwrap();
  s.resolve_day(date("2024-07-01")).await.unwrap();

  let days = s.month_days(2024, 6).await.unwrap();
  assert_eq!(days.len(), 2);
  assert_eq!(days[0].1, date("2024-06-03"));
  assert_eq!(days[1].1, date("2024-06-17"));
}

// ─── Daily records ───────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_daily_starts_empty() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert_eq!(record.user_id, user);
  assert_eq!(record.day_id, day);
  assert!(record.activity_score.is_none());
  assert!(record.metabolic_score_history.is_empty());
  assert!(record.heart_rate_samples.is_empty());
}

#[tokio::test]
async fn set_daily_score_persists() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  s.set_daily_score(user, day, ScoreKind::Sleep, 82.5)
    .await
    .unwrap();

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert_eq!(record.sleep_score, Some(82.5));
  assert!(record.metabolic_score_history.is_empty());
}

#[tokio::test]
async fn metabolic_score_appends_history() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  s.set_daily_score(user, day, ScoreKind::Metabolic, 60.0)
    .await
    .unwrap();
  s.set_daily_score(user, day, ScoreKind::Metabolic, 72.0)
    .await
    .unwrap();

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert_eq!(record.metabolic_score, Some(72.0));
  let values: Vec<f64> = record
    .metabolic_score_history
    .iter()
    .map(|s| s.value)
    .collect();
  assert_eq!(values, vec![60.0, 72.0]);
}

#[tokio::test]
async fn measurement_update_is_partial() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  s.update_daily_measurements(user, day, MeasurementUpdate {
    total_steps: Some(8_200),
    weight_kg: Some(71.4),
    ..Default::default()
  })
  .await
  .unwrap();
  s.update_daily_measurements(user, day, MeasurementUpdate {
    total_steps: Some(9_001),
    ..Default::default()
  })
  .await
  .unwrap();

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert_eq!(record.total_steps, Some(9_001));
  assert_eq!(record.weight_kg, Some(71.4));
  assert!(record.total_energy_burned.is_none());
}

#[tokio::test]
async fn heart_samples_merge_by_timestamp() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  let t1 = chrono::DateTime::parse_from_rfc3339("2024-06-10T08:00:00Z")
    .unwrap()
    .with_timezone(&chrono::Utc);
  let t2 = chrono::DateTime::parse_from_rfc3339("2024-06-10T08:05:00Z")
    .unwrap()
    .with_timezone(&chrono::Utc);

  s.ingest_heart_samples(user, day, vec![
    HeartRateSample { time: t1, bpm: 64.0 },
    HeartRateSample { time: t2, bpm: 71.0 },
  ])
  .await
  .unwrap();

  // Re-ingesting t1 must not duplicate it.
  s.ingest_heart_samples(user, day, vec![HeartRateSample {
    time: t1,
    bpm:  99.0,
  }])
  .await
  .unwrap();

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert_eq!(record.heart_rate_samples.len(), 2);
  assert_eq!(record.heart_rate_samples[0].bpm, 64.0);
}

// ─── Monthly rollups ─────────────────────────────────────────────────────────

fn sample_rollup(domain: MetricDomain, day_id: Uuid) -> MonthlyRollup {
  MonthlyRollup::build(
    domain,
    vec![DaySummary {
      day_id,
      date: date("2024-06-10"),
      value: Some(75.0),
    }],
    chrono::Utc::now(),
  )
}

#[tokio::test]
async fn monthly_rollup_round_trips_per_domain() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  let sleep = sample_rollup(MetricDomain::Sleep, day);
  s.put_monthly_rollup(user, 2024, 6, &sleep).await.unwrap();

  let fetched = s
    .get_monthly_rollup(user, 2024, 6, MetricDomain::Sleep)
    .await
    .unwrap()
    .expect("rollup stored");
  assert_eq!(fetched.domain, MetricDomain::Sleep);
  assert_eq!(fetched.summary.counted_days, 1);

  // A different domain in the same month is still empty.
  let steps = s
    .get_monthly_rollup(user, 2024, 6, MetricDomain::Steps)
    .await
    .unwrap();
  assert!(steps.is_none());
}

#[tokio::test]
async fn monthly_rollup_overwrite_replaces() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day_a = s.resolve_day(date("2024-06-10")).await.unwrap();
  let day_b = s.resolve_day(date("2024-06-11")).await.unwrap();

  s.put_monthly_rollup(user, 2024, 6, &sample_rollup(MetricDomain::Food, day_a))
    .await
    .unwrap();

  let bigger = MonthlyRollup::build(
    MetricDomain::Food,
    vec![
      DaySummary { day_id: day_a, date: date("2024-06-10"), value: Some(70.0) },
      DaySummary { day_id: day_b, date: date("2024-06-11"), value: Some(80.0) },
    ],
    chrono::Utc::now(),
  );
  s.put_monthly_rollup(user, 2024, 6, &bigger).await.unwrap();

  let fetched = s
    .get_monthly_rollup(user, 2024, 6, MetricDomain::Food)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.days.len(), 2);
  assert_eq!(fetched.summary.average, Some(75.0));
}

// ─── Plans ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_plan_upserts_per_slot() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  let first = s
    .put_plan(user, day, PlanDomain::Diet, vec![option_named("oats")])
    .await
    .unwrap();
  let second = s
    .put_plan(user, day, PlanDomain::Diet, vec![
      option_named("eggs"),
      option_named("oats"),
    ])
    .await
    .unwrap();

  // Same slot, so the plan id is stable across the overwrite.
  assert_eq!(first.plan_id, second.plan_id);
  assert_eq!(second.options.len(), 2);
  assert_eq!(second.options[0].name, "eggs");

  let fetched = s.get_plan(user, day, PlanDomain::Diet).await.unwrap();
  assert_eq!(fetched.unwrap().options.len(), 2);
}

#[tokio::test]
async fn plans_are_scoped_by_domain() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  s.put_plan(user, day, PlanDomain::Diet, vec![option_named("oats")])
    .await
    .unwrap();

  let exercise = s.get_plan(user, day, PlanDomain::Exercise).await.unwrap();
  assert!(exercise.is_none());
}

#[tokio::test]
async fn delete_plan_reports_existence() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-10")).await.unwrap();

  s.put_plan(user, day, PlanDomain::Exercise, vec![option_named("run")])
    .await
    .unwrap();

  assert!(s.delete_plan(user, day, PlanDomain::Exercise).await.unwrap());
  assert!(!s.delete_plan(user, day, PlanDomain::Exercise).await.unwrap());
  assert!(
    s.get_plan(user, day, PlanDomain::Exercise)
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn plan_dates_spans_months() {
  let s = store().await;
  let user = Uuid::new_v4();

  for d in ["2024-06-29", "2024-06-30", "2024-07-01"] {
    let day = s.resolve_day(date(d)).await.unwrap();
    s.put_plan(user, day, PlanDomain::Diet, vec![option_named("x")])
      .await
      .unwrap();
  }
  // Another user's plans are invisible.
  let other = Uuid::new_v4();
  let day = s.resolve_day(date("2024-06-29")).await.unwrap();
  s.put_plan(other, day, PlanDomain::Diet, vec![option_named("y")])
    .await
    .unwrap();

  let mut dates = s.plan_dates(user, PlanDomain::Diet).await.unwrap();
  dates.sort();
  assert_eq!(dates, vec![
    date("2024-06-29"),
    date("2024-06-30"),
    date("2024-07-01"),
  ]);
}

// ─── Fact sessions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn record_session_clears_dependent_score() {
  let s = store().await;
  let user = Uuid::new_v4();
  let d = date("2024-06-10");
  let day = s.resolve_day(d).await.unwrap();

  s.set_daily_score(user, day, ScoreKind::Sleep, 90.0)
    .await
    .unwrap();
  s.set_daily_score(user, day, ScoreKind::Food, 55.0)
    .await
    .unwrap();

  let session = s
    .record_session(NewFactSession {
      user_id: user,
      date:    d,
      domain:  MetricDomain::Sleep,
      payload: serde_json::json!({ "duration_minutes": 410 }),
    })
    .await
    .unwrap();
  assert_eq!(session.day_id, day);

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert!(record.sleep_score.is_none());
  // Unrelated kinds are untouched.
  assert_eq!(record.food_score, Some(55.0));
}

#[tokio::test]
async fn measurement_domain_session_clears_nothing() {
  let s = store().await;
  let user = Uuid::new_v4();
  let d = date("2024-06-10");
  let day = s.resolve_day(d).await.unwrap();

  s.set_daily_score(user, day, ScoreKind::Activity, 64.0)
    .await
    .unwrap();

  s.record_session(NewFactSession {
    user_id: user,
    date:    d,
    domain:  MetricDomain::Weight,
    payload: serde_json::json!({ "weight_kg": 70.2 }),
  })
  .await
  .unwrap();

  let record = s.get_or_create_daily(user, day).await.unwrap();
  assert_eq!(record.activity_score, Some(64.0));
}

#[tokio::test]
async fn latest_fact_timestamp_day_scope() {
  let s = store().await;
  let user = Uuid::new_v4();
  let d = date("2024-06-10");
  let day = s.resolve_day(d).await.unwrap();

  assert!(
    s.latest_fact_timestamp(user, FactScope::Day(day), MetricDomain::Sleep)
      .await
      .unwrap()
      .is_none()
  );

  let first = s
    .record_session(NewFactSession {
      user_id: user,
      date:    d,
      domain:  MetricDomain::Sleep,
      payload: serde_json::json!({}),
    })
    .await
    .unwrap();
  let second = s
    .record_session(NewFactSession {
      user_id: user,
      date:    d,
      domain:  MetricDomain::Sleep,
      payload: serde_json::json!({}),
    })
    .await
    .unwrap();
  assert!(second.recorded_at >= first.recorded_at);

  let latest = s
    .latest_fact_timestamp(user, FactScope::Day(day), MetricDomain::Sleep)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(latest, second.recorded_at);
}

#[tokio::test]
async fn latest_fact_timestamp_month_scope() {
  let s = store().await;
  let user = Uuid::new_v4();

  s.record_session(NewFactSession {
    user_id: user,
    date:    date("2024-06-10"),
    domain:  MetricDomain::Activity,
    payload: serde_json::json!({}),
  })
  .await
  .unwrap();
  let later = s
    .record_session(NewFactSession {
      user_id: user,
      date:    date("2024-06-25"),
      domain:  MetricDomain::Activity,
      payload: serde_json::json!({}),
    })
    .await
    .unwrap();

  let latest = s
    .latest_fact_timestamp(
      user,
      FactScope::Month { year: 2024, month: 6 },
      MetricDomain::Activity,
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(latest, later.recorded_at);

  // Adjacent month has no facts.
  assert!(
    s.latest_fact_timestamp(
      user,
      FactScope::Month { year: 2024, month: 7 },
      MetricDomain::Activity,
    )
    .await
    .unwrap()
    .is_none()
  );
}

#[tokio::test]
async fn raw_facts_filtered_by_domain() {
  let s = store().await;
  let user = Uuid::new_v4();
  let d = date("2024-06-10");
  let day = s.resolve_day(d).await.unwrap();

  s.record_session(NewFactSession {
    user_id: user,
    date:    d,
    domain:  MetricDomain::Sleep,
    payload: serde_json::json!({ "n": 1 }),
  })
  .await
  .unwrap();
  s.record_session(NewFactSession {
    user_id: user,
    date:    d,
    domain:  MetricDomain::Food,
    payload: serde_json::json!({ "n": 2 }),
  })
  .await
  .unwrap();

  let facts = s.raw_facts(user, day, MetricDomain::Sleep).await.unwrap();
  assert_eq!(facts.domain, MetricDomain::Sleep);
  assert_eq!(facts.sessions.len(), 1);
  assert_eq!(facts.sessions[0].payload["n"], 1);
}

// ─── Profiles ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn profile_crud_round_trip() {
  let s = store().await;
  let mut profile = UserProfile::new(Uuid::new_v4(), chrono::Utc::now());
  profile.height_cm = Some(172.0);
  profile.health_goals = vec!["sleep more".into()];

  s.create_profile(&profile).await.unwrap();
  let fetched = s.get_profile(profile.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.height_cm, Some(172.0));
  assert_eq!(fetched.health_goals, vec!["sleep more".to_owned()]);

  profile.weight_kg = Some(68.0);
  s.update_profile(&profile).await.unwrap();
  let fetched = s.get_profile(profile.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.weight_kg, Some(68.0));
}

#[tokio::test]
async fn get_profile_missing_returns_none() {
  let s = store().await;
  assert!(s.get_profile(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_users_enumerates_profiles() {
  let s = store().await;
  let a = UserProfile::new(Uuid::new_v4(), chrono::Utc::now());
  let b = UserProfile::new(Uuid::new_v4(), chrono::Utc::now());
  s.create_profile(&a).await.unwrap();
  s.create_profile(&b).await.unwrap();

  let users = s.list_users().await.unwrap();
  assert_eq!(users.len(), 2);
  assert!(users.contains(&a.user_id));
  assert!(users.contains(&b.user_id));
}
