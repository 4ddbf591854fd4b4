//! [`SqliteStore`] — the SQLite implementation of [`HealthStore`] and
//! [`FactStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use pulse_core::{
  date::date_parts,
  facts::{FactScope, FactSession, FactSet, FactStore, NewFactSession},
  metric::{
    DailyMetricRecord, HeartRateSample, MeasurementUpdate, MetricDomain, ScoreKind, ScoreSample,
  },
  plan::{PlanDomain, PlanOption, PlanRecord},
  profile::UserProfile,
  rollup::MonthlyRollup,
  store::HealthStore,
};

use crate::{
  encode::{
    RawDaily, RawPlan, RawProfile, RawSession, compose_date, decode_dt, decode_json, decode_uuid,
    encode_dt, encode_json, encode_uuid, rollup_column,
  },
  schema::SCHEMA,
  Error, Result,
};

/// The `daily_metrics` column caching a score kind.
fn score_column(kind: ScoreKind) -> &'static str {
  match kind {
    ScoreKind::Activity => "activity_score",
    ScoreKind::Sleep => "sleep_score",
    ScoreKind::Food => "food_score",
    ScoreKind::Metabolic => "metabolic_score",
  }
}

const DAILY_COLUMNS: &str = "user_id, day_id, activity_score, sleep_score, food_score, \
   metabolic_score, metabolic_score_history, total_energy_burned, total_steps, \
   distance_covered_m, weight_kg, resting_heart_rate, max_heart_rate, min_heart_rate, \
   heart_rate_samples, medication_adherence, created_at, updated_at";

fn read_daily_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDaily> {
  Ok(RawDaily {
    user_id:                 row.get(0)?,
    day_id:                  row.get(1)?,
    activity_score:          row.get(2)?,
    sleep_score:             row.get(3)?,
    food_score:              row.get(4)?,
    metabolic_score:         row.get(5)?,
    metabolic_score_history: row.get(6)?,
    total_energy_burned:     row.get(7)?,
    total_steps:             row.get(8)?,
    distance_covered_m:      row.get(9)?,
    weight_kg:               row.get(10)?,
    resting_heart_rate:      row.get(11)?,
    max_heart_rate:          row.get(12)?,
    min_heart_rate:          row.get(13)?,
    heart_rate_samples:      row.get(14)?,
    medication_adherence:    row.get(15)?,
    created_at:              row.get(16)?,
    updated_at:              row.get(17)?,
  })
}

fn read_plan_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPlan> {
  Ok(RawPlan {
    plan_id:      row.get(0)?,
    user_id:      row.get(1)?,
    day_id:       row.get(2)?,
    domain:       row.get(3)?,
    options_json: row.get(4)?,
    created_at:   row.get(5)?,
    updated_at:   row.get(6)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Pulse health store backed by a single SQLite file.
///
/// Cheap to clone; all clones share one reference-counted connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database at `path` and apply the schema.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// A store over an in-memory database, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Temporal key chain ────────────────────────────────────────────────────

  /// Fast path: a single read join across the three-level chain.
  async fn lookup_day(&self, year: i32, month: u32, day: u32) -> Result<Option<Uuid>> {
    let found: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT d.day_id
               FROM days d
               JOIN months m ON m.month_id = d.month_id
               JOIN years  y ON y.year_id  = m.year_id
               WHERE y.year = ?1 AND m.month = ?2 AND d.day = ?3",
              rusqlite::params![year, month, day],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    found.as_deref().map(decode_uuid).transpose()
  }

  /// Slow path: idempotent upsert of each chain level, then re-read the day
  /// key. `ON CONFLICT DO NOTHING` makes concurrent creation converge on
  /// the winning row instead of failing. Returns `None` only if another
  /// writer's transaction is still invisible — the caller retries once.
  async fn upsert_day_chain(&self, year: i32, month: u32, day: u32) -> Result<Option<Uuid>> {
    let year_candidate  = encode_uuid(Uuid::new_v4());
    let month_candidate = encode_uuid(Uuid::new_v4());
    let day_candidate   = encode_uuid(Uuid::new_v4());

    let found: Option<String> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO years (year_id, year) VALUES (?1, ?2)
           ON CONFLICT (year) DO NOTHING",
          rusqlite::params![year_candidate, year],
        )?;
        let year_id: Option<String> = conn
          .query_row(
            "SELECT year_id FROM years WHERE year = ?1",
            rusqlite::params![year],
            |row| row.get(0),
          )
          .optional()?;
        let Some(year_id) = year_id else { return Ok(None) };

        conn.execute(
          "INSERT INTO months (month_id, year_id, month) VALUES (?1, ?2, ?3)
           ON CONFLICT (year_id, month) DO NOTHING",
          rusqlite::params![month_candidate, year_id, month],
        )?;
        let month_id: Option<String> = conn
          .query_row(
            "SELECT month_id FROM months WHERE year_id = ?1 AND month = ?2",
            rusqlite::params![year_id, month],
            |row| row.get(0),
          )
          .optional()?;
        let Some(month_id) = month_id else { return Ok(None) };

        conn.execute(
          "INSERT INTO days (day_id, month_id, day) VALUES (?1, ?2, ?3)
           ON CONFLICT (month_id, day) DO NOTHING",
          rusqlite::params![day_candidate, month_id, day],
        )?;
        let day_id: Option<String> = conn
          .query_row(
            "SELECT day_id FROM days WHERE month_id = ?1 AND day = ?2",
            rusqlite::params![month_id, day],
            |row| row.get(0),
          )
          .optional()?;

        Ok(day_id)
      })
      .await?;

    found.as_deref().map(decode_uuid).transpose()
  }

  /// Ensure a `daily_metrics` row exists and return its sample-history
  /// columns for a read-modify-write.
  async fn ensure_daily_row(
    &self,
    user_id: Uuid,
    day_id: Uuid,
  ) -> Result<(String, String)> {
    let user_str = encode_uuid(user_id);
    let day_str  = encode_uuid(day_id);
    let now_str  = encode_dt(Utc::now());

    let (history, samples): (String, String) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO daily_metrics (user_id, day_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![user_str, day_str, now_str],
        )?;
        conn.query_row(
          "SELECT metabolic_score_history, heart_rate_samples
           FROM daily_metrics WHERE user_id = ?1 AND day_id = ?2",
          rusqlite::params![user_str, day_str],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(Into::into)
      })
      .await?;

    Ok((history, samples))
  }
}

// ─── HealthStore impl ────────────────────────────────────────────────────────

impl HealthStore for SqliteStore {
  type Error = Error;

  // ── Temporal keys ─────────────────────────────────────────────────────────

  async fn resolve_day(&self, date: NaiveDate) -> Result<Uuid> {
    let (year, month, day) = date_parts(date);

    if let Some(id) = self.lookup_day(year, month, day).await? {
      return Ok(id);
    }

    // Create-or-fetch each level; one bounded retry covers a concurrent
    // writer whose chain was not yet visible on the first pass.
    for _ in 0..2 {
      if let Some(id) = self.upsert_day_chain(year, month, day).await? {
        return Ok(id);
      }
    }

    Err(Error::TemporalResolution { year, month, day })
  }

  async fn day_date(&self, day_id: Uuid) -> Result<Option<NaiveDate>> {
    let day_str = encode_uuid(day_id);

    let parts: Option<(i32, u32, u32)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT y.year, m.month, d.day
               FROM days d
               JOIN months m ON m.month_id = d.month_id
               JOIN years  y ON y.year_id  = m.year_id
               WHERE d.day_id = ?1",
              rusqlite::params![day_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?,
        )
      })
      .await?;

    parts.map(|(y, m, d)| compose_date(y, m, d)).transpose()
  }

  async fn month_days(&self, year: i32, month: u32) -> Result<Vec<(Uuid, NaiveDate)>> {
    let rows: Vec<(String, u32)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT d.day_id, d.day
           FROM days d
           JOIN months m ON m.month_id = d.month_id
           JOIN years  y ON y.year_id  = m.year_id
           WHERE y.year = ?1 AND m.month = ?2
           ORDER BY d.day",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![year, month], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id_str, day)| Ok((decode_uuid(&id_str)?, compose_date(year, month, day)?)))
      .collect()
  }

  // ── Daily records ─────────────────────────────────────────────────────────

  async fn get_or_create_daily(&self, user_id: Uuid, day_id: Uuid) -> Result<DailyMetricRecord> {
    let user_str = encode_uuid(user_id);
    let day_str  = encode_uuid(day_id);
    let now_str  = encode_dt(Utc::now());

    let raw: RawDaily = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO daily_metrics (user_id, day_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![user_str, day_str, now_str],
        )?;
        conn
          .query_row(
            &format!(
              "SELECT {DAILY_COLUMNS} FROM daily_metrics
               WHERE user_id = ?1 AND day_id = ?2"
            ),
            rusqlite::params![user_str, day_str],
            read_daily_row,
          )
          .map_err(Into::into)
      })
      .await?;

    raw.into_record()
  }

  async fn set_daily_score(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    kind: ScoreKind,
    value: f64,
  ) -> Result<()> {
    let now = Utc::now();
    let (history_json, _) = self.ensure_daily_row(user_id, day_id).await?;

    let history_update = if kind.keeps_history() {
      let mut history: Vec<ScoreSample> = decode_json(&history_json)?;
      history.push(ScoreSample { recorded_at: now, value });
      Some(encode_json(&history)?)
    } else {
      None
    };

    let user_str = encode_uuid(user_id);
    let day_str  = encode_uuid(day_id);
    let now_str  = encode_dt(now);
    let column   = score_column(kind);

    self
      .conn
      .call(move |conn| {
        match history_update {
          Some(history) => conn.execute(
            &format!(
              "UPDATE daily_metrics
               SET {column} = ?1, metabolic_score_history = ?2, updated_at = ?3
               WHERE user_id = ?4 AND day_id = ?5"
            ),
            rusqlite::params![value, history, now_str, user_str, day_str],
          )?,
          None => conn.execute(
            &format!(
              "UPDATE daily_metrics SET {column} = ?1, updated_at = ?2
               WHERE user_id = ?3 AND day_id = ?4"
            ),
            rusqlite::params![value, now_str, user_str, day_str],
          )?,
        };
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn update_daily_measurements(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    update: MeasurementUpdate,
  ) -> Result<()> {
    use rusqlite::types::Value;

    let user_str = encode_uuid(user_id);
    let day_str  = encode_uuid(day_id);
    let now_str  = encode_dt(Utc::now());

    // Build SET clauses for the fields actually present.
    let mut sets: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    let mut push = |column: &str, value: Value| {
      values.push(value);
      sets.push(format!("{column} = ?{}", values.len()));
    };

    if let Some(v) = update.total_energy_burned {
      push("total_energy_burned", Value::Real(v));
    }
    if let Some(v) = update.total_steps {
      push("total_steps", Value::Integer(v));
    }
    if let Some(v) = update.distance_covered_m {
      push("distance_covered_m", Value::Real(v));
    }
    if let Some(v) = update.weight_kg {
      push("weight_kg", Value::Real(v));
    }
    if let Some(v) = update.resting_heart_rate {
      push("resting_heart_rate", Value::Real(v));
    }
    if let Some(v) = update.max_heart_rate {
      push("max_heart_rate", Value::Real(v));
    }
    if let Some(v) = update.min_heart_rate {
      push("min_heart_rate", Value::Real(v));
    }
    if let Some(v) = update.medication_adherence {
      push("medication_adherence", Value::Real(v));
    }
    push("updated_at", Value::Text(now_str.clone()));

    let n = values.len();
    let sql = format!(
      "UPDATE daily_metrics SET {} WHERE user_id = ?{} AND day_id = ?{}",
      sets.join(", "),
      n + 1,
      n + 2,
    );
    values.push(Value::Text(user_str.clone()));
    values.push(Value::Text(day_str.clone()));

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO daily_metrics (user_id, day_id, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)",
          rusqlite::params![user_str, day_str, now_str],
        )?;
        conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn ingest_heart_samples(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    samples: Vec<HeartRateSample>,
  ) -> Result<()> {
    let (_, samples_json) = self.ensure_daily_row(user_id, day_id).await?;

    // Merge by timestamp: existing readings are never duplicated.
    let mut merged: Vec<HeartRateSample> = decode_json(&samples_json)?;
    for sample in samples {
      if !merged.iter().any(|s| s.time == sample.time) {
        merged.push(sample);
      }
    }
    merged.sort_by_key(|s| s.time);

    let merged_json = encode_json(&merged)?;
    let user_str = encode_uuid(user_id);
    let day_str  = encode_uuid(day_id);
    let now_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE daily_metrics SET heart_rate_samples = ?1, updated_at = ?2
           WHERE user_id = ?3 AND day_id = ?4",
          rusqlite::params![merged_json, now_str, user_str, day_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Monthly rollups ───────────────────────────────────────────────────────

  async fn get_monthly_rollup(
    &self,
    user_id: Uuid,
    year: i32,
    month: u32,
    domain: MetricDomain,
  ) -> Result<Option<MonthlyRollup>> {
    let user_str = encode_uuid(user_id);
    let column   = rollup_column(domain);

    let json: Option<String> = self
      .conn
      .call(move |conn| {
        let cell: Option<Option<String>> = conn
          .query_row(
            &format!(
              "SELECT {column} FROM monthly_metrics
               WHERE user_id = ?1 AND year = ?2 AND month = ?3"
            ),
            rusqlite::params![user_str, year, month],
            |row| row.get(0),
          )
          .optional()?;
        Ok(cell.flatten())
      })
      .await?;

    json.as_deref().map(decode_json).transpose()
  }

  async fn put_monthly_rollup<'a>(
    &'a self,
    user_id: Uuid,
    year: i32,
    month: u32,
    rollup: &'a MonthlyRollup,
  ) -> Result<()> {
    let user_str    = encode_uuid(user_id);
    let rollup_json = encode_json(rollup)?;
    let now_str     = encode_dt(Utc::now());
    let column      = rollup_column(rollup.domain);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO monthly_metrics (user_id, year, month, {column}, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (user_id, year, month)
             DO UPDATE SET {column} = excluded.{column}, updated_at = excluded.updated_at"
          ),
          rusqlite::params![user_str, year, month, rollup_json, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn get_plan(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    domain: PlanDomain,
  ) -> Result<Option<PlanRecord>> {
    let user_str   = encode_uuid(user_id);
    let day_str    = encode_uuid(day_id);
    let domain_str = domain.as_str();

    let raw: Option<RawPlan> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT plan_id, user_id, day_id, domain, options_json, created_at, updated_at
               FROM plans WHERE user_id = ?1 AND day_id = ?2 AND domain = ?3",
              rusqlite::params![user_str, day_str, domain_str],
              read_plan_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlan::into_plan).transpose()
  }

  async fn put_plan(
    &self,
    user_id: Uuid,
    day_id: Uuid,
    domain: PlanDomain,
    options: Vec<PlanOption>,
  ) -> Result<PlanRecord> {
    let user_str     = encode_uuid(user_id);
    let day_str      = encode_uuid(day_id);
    let domain_str   = domain.as_str();
    let options_json = encode_json(&options)?;
    let candidate_id = encode_uuid(Uuid::new_v4());
    let now_str      = encode_dt(Utc::now());

    let raw: RawPlan = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO plans (plan_id, user_id, day_id, domain, options_json, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
           ON CONFLICT (user_id, day_id, domain)
           DO UPDATE SET options_json = excluded.options_json, updated_at = excluded.updated_at",
          rusqlite::params![candidate_id, user_str, day_str, domain_str, options_json, now_str],
        )?;
        conn
          .query_row(
            "SELECT plan_id, user_id, day_id, domain, options_json, created_at, updated_at
             FROM plans WHERE user_id = ?1 AND day_id = ?2 AND domain = ?3",
            rusqlite::params![user_str, day_str, domain_str],
            read_plan_row,
          )
          .map_err(Into::into)
      })
      .await?;

    raw.into_plan()
  }

  async fn delete_plan(&self, user_id: Uuid, day_id: Uuid, domain: PlanDomain) -> Result<bool> {
    let user_str   = encode_uuid(user_id);
    let day_str    = encode_uuid(day_id);
    let domain_str = domain.as_str();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM plans WHERE user_id = ?1 AND day_id = ?2 AND domain = ?3",
          rusqlite::params![user_str, day_str, domain_str],
        )?)
      })
      .await?;

    Ok(deleted > 0)
  }

  async fn plan_dates(&self, user_id: Uuid, domain: PlanDomain) -> Result<Vec<NaiveDate>> {
    let user_str   = encode_uuid(user_id);
    let domain_str = domain.as_str();

    let rows: Vec<(i32, u32, u32)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT y.year, m.month, d.day
           FROM plans p
           JOIN days d   ON d.day_id   = p.day_id
           JOIN months m ON m.month_id = d.month_id
           JOIN years y  ON y.year_id  = m.year_id
           WHERE p.user_id = ?1 AND p.domain = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, domain_str], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(y, m, d)| compose_date(y, m, d))
      .collect()
  }

  // ── Fact ingestion ────────────────────────────────────────────────────────

  async fn record_session(&self, input: NewFactSession) -> Result<FactSession> {
    let day_id = self.resolve_day(input.date).await?;

    let session = FactSession {
      session_id: Uuid::new_v4(),
      user_id: input.user_id,
      day_id,
      domain: input.domain,
      recorded_at: Utc::now(),
      payload: input.payload,
    };

    let session_str  = encode_uuid(session.session_id);
    let user_str     = encode_uuid(session.user_id);
    let day_str      = encode_uuid(day_id);
    let domain_str   = session.domain.as_str();
    let recorded_str = encode_dt(session.recorded_at);
    let payload_json = encode_json(&session.payload)?;

    // A new fact invalidates the day's cached score for the dependent kind,
    // so the next read recomputes. Measurement-only domains clear nothing.
    let stale_column = [
      ScoreKind::Activity,
      ScoreKind::Sleep,
      ScoreKind::Food,
      ScoreKind::Metabolic,
    ]
    .into_iter()
    .find(|kind| kind.fact_domain() == session.domain)
    .map(score_column);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO fact_sessions (session_id, user_id, day_id, domain, recorded_at, payload_json)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![session_str, user_str, day_str, domain_str, recorded_str, payload_json],
        )?;
        if let Some(column) = stale_column {
          conn.execute(
            &format!(
              "UPDATE daily_metrics SET {column} = NULL, updated_at = ?1
               WHERE user_id = ?2 AND day_id = ?3"
            ),
            rusqlite::params![recorded_str, user_str, day_str],
          )?;
        }
        Ok(())
      })
      .await?;

    Ok(session)
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn create_profile<'a>(&'a self, profile: &'a UserProfile) -> Result<()> {
    let user_str       = encode_uuid(profile.user_id);
    let created_str    = encode_dt(profile.created_at);
    let height         = profile.height_cm;
    let weight         = profile.weight_kg;
    let goals          = encode_json(&profile.health_goals)?;
    let conditions     = encode_json(&profile.medical_conditions)?;
    let preferences    = encode_json(&profile.diet_preferences)?;
    let disliked_meals = encode_json(&profile.disliked_meals)?;
    let disliked_work  = encode_json(&profile.disliked_workouts)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_profiles (
             user_id, created_at, height_cm, weight_kg,
             health_goals, medical_conditions, diet_preferences,
             disliked_meals, disliked_workouts
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            user_str,
            created_str,
            height,
            weight,
            goals,
            conditions,
            preferences,
            disliked_meals,
            disliked_work,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
    let user_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, created_at, height_cm, weight_kg,
                      health_goals, medical_conditions, diet_preferences,
                      disliked_meals, disliked_workouts
               FROM user_profiles WHERE user_id = ?1",
              rusqlite::params![user_str],
              |row| {
                Ok(RawProfile {
                  user_id:            row.get(0)?,
                  created_at:         row.get(1)?,
                  height_cm:          row.get(2)?,
                  weight_kg:          row.get(3)?,
                  health_goals:       row.get(4)?,
                  medical_conditions: row.get(5)?,
                  diet_preferences:   row.get(6)?,
                  disliked_meals:     row.get(7)?,
                  disliked_workouts:  row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile<'a>(&'a self, profile: &'a UserProfile) -> Result<()> {
    let user_str       = encode_uuid(profile.user_id);
    let height         = profile.height_cm;
    let weight         = profile.weight_kg;
    let goals          = encode_json(&profile.health_goals)?;
    let conditions     = encode_json(&profile.medical_conditions)?;
    let preferences    = encode_json(&profile.diet_preferences)?;
    let disliked_meals = encode_json(&profile.disliked_meals)?;
    let disliked_work  = encode_json(&profile.disliked_workouts)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE user_profiles SET
             height_cm = ?2, weight_kg = ?3, health_goals = ?4,
             medical_conditions = ?5, diet_preferences = ?6,
             disliked_meals = ?7, disliked_workouts = ?8
           WHERE user_id = ?1",
          rusqlite::params![
            user_str,
            height,
            weight,
            goals,
            conditions,
            preferences,
            disliked_meals,
            disliked_work,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn list_users(&self) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT user_id FROM user_profiles ORDER BY created_at")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }
}

// ─── FactStore impl ──────────────────────────────────────────────────────────

impl FactStore for SqliteStore {
  type Error = Error;

  async fn latest_fact_timestamp(
    &self,
    user_id: Uuid,
    scope: FactScope,
    domain: MetricDomain,
  ) -> Result<Option<chrono::DateTime<Utc>>> {
    let user_str   = encode_uuid(user_id);
    let domain_str = domain.as_str();

    let latest: Option<String> = match scope {
      FactScope::Day(day_id) => {
        let day_str = encode_uuid(day_id);
        self
          .conn
          .call(move |conn| {
            Ok(
              conn
                .query_row(
                  "SELECT recorded_at FROM fact_sessions
                   WHERE user_id = ?1 AND day_id = ?2 AND domain = ?3
                   ORDER BY recorded_at DESC LIMIT 1",
                  rusqlite::params![user_str, day_str, domain_str],
                  |row| row.get(0),
                )
                .optional()?,
            )
          })
          .await?
      }
      FactScope::Month { year, month } => {
        self
          .conn
          .call(move |conn| {
            Ok(
              conn
                .query_row(
                  "SELECT f.recorded_at FROM fact_sessions f
                   JOIN days d   ON d.day_id   = f.day_id
                   JOIN months m ON m.month_id = d.month_id
                   JOIN years y  ON y.year_id  = m.year_id
                   WHERE f.user_id = ?1 AND f.domain = ?2
                     AND y.year = ?3 AND m.month = ?4
                   ORDER BY f.recorded_at DESC LIMIT 1",
                  rusqlite::params![user_str, domain_str, year, month],
                  |row| row.get(0),
                )
                .optional()?,
            )
          })
          .await?
      }
    };

    latest.as_deref().map(decode_dt).transpose()
  }

  async fn raw_facts(&self, user_id: Uuid, day_id: Uuid, domain: MetricDomain) -> Result<FactSet> {
    let user_str   = encode_uuid(user_id);
    let day_str    = encode_uuid(day_id);
    let domain_str = domain.as_str();

    let raws: Vec<RawSession> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT session_id, user_id, day_id, domain, recorded_at, payload_json
           FROM fact_sessions
           WHERE user_id = ?1 AND day_id = ?2 AND domain = ?3
           ORDER BY recorded_at",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, day_str, domain_str], |row| {
            Ok(RawSession {
              session_id:   row.get(0)?,
              user_id:      row.get(1)?,
              day_id:       row.get(2)?,
              domain:       row.get(3)?,
              recorded_at:  row.get(4)?,
              payload_json: row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let sessions = raws
      .into_iter()
      .map(RawSession::into_session)
      .collect::<Result<Vec<_>>>()?;

    Ok(FactSet { domain, sessions })
  }
}
