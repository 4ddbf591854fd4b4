//! SQL schema for the Pulse SQLite store.
//!
//! Executed on every open. `user_version` is bumped so that later schema
//! revisions have something to migrate from.

/// Complete DDL. Safe to re-run: every statement is `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Temporal key chain. Rows are append-only: created lazily on first
-- reference to a date, never updated, never deleted. The UNIQUE
-- constraints at each level are what make concurrent creation resolvable.
CREATE TABLE IF NOT EXISTS years (
    year_id TEXT PRIMARY KEY,
    year    INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS months (
    month_id TEXT PRIMARY KEY,
    year_id  TEXT NOT NULL REFERENCES years(year_id),
    month    INTEGER NOT NULL,
    UNIQUE (year_id, month)
);

CREATE TABLE IF NOT EXISTS days (
    day_id   TEXT PRIMARY KEY,
    month_id TEXT NOT NULL REFERENCES months(month_id),
    day      INTEGER NOT NULL,
    UNIQUE (month_id, day)
);

-- One cached record per (user, day). Score columns are NULL until the
-- scoring flow fills them in.
CREATE TABLE IF NOT EXISTS daily_metrics (
    user_id                 TEXT NOT NULL,
    day_id                  TEXT NOT NULL REFERENCES days(day_id),
    activity_score          REAL,
    sleep_score             REAL,
    food_score              REAL,
    metabolic_score         REAL,
    metabolic_score_history TEXT NOT NULL DEFAULT '[]',
    total_energy_burned     REAL,
    total_steps             INTEGER,
    distance_covered_m      REAL,
    weight_kg               REAL,
    resting_heart_rate      REAL,
    max_heart_rate          REAL,
    min_heart_rate          REAL,
    heart_rate_samples      TEXT NOT NULL DEFAULT '[]',
    medication_adherence    REAL,
    created_at              TEXT NOT NULL,
    updated_at              TEXT NOT NULL,
    PRIMARY KEY (user_id, day_id)
);

-- One row per (user, year, month); one nullable rollup column per domain.
CREATE TABLE IF NOT EXISTS monthly_metrics (
    user_id           TEXT NOT NULL,
    year              INTEGER NOT NULL,
    month             INTEGER NOT NULL,
    rollup_activity   TEXT,
    rollup_sleep      TEXT,
    rollup_food       TEXT,
    rollup_steps      TEXT,
    rollup_weight     TEXT,
    rollup_heart_rate TEXT,
    rollup_medication TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    PRIMARY KEY (user_id, year, month)
);

CREATE TABLE IF NOT EXISTS plans (
    plan_id      TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL,
    day_id       TEXT NOT NULL REFERENCES days(day_id),
    domain       TEXT NOT NULL,   -- 'diet' | 'exercise'
    options_json TEXT NOT NULL,   -- ranked option list; never empty
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    UNIQUE (user_id, day_id, domain)
);

-- Raw-fact sessions. recorded_at is server-assigned at ingestion time;
-- it anchors all staleness comparisons.
CREATE TABLE IF NOT EXISTS fact_sessions (
    session_id   TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL,
    day_id       TEXT NOT NULL REFERENCES days(day_id),
    domain       TEXT NOT NULL,
    recorded_at  TEXT NOT NULL,
    payload_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_profiles (
    user_id            TEXT PRIMARY KEY,
    created_at         TEXT NOT NULL,
    height_cm          REAL,
    weight_kg          REAL,
    health_goals       TEXT NOT NULL DEFAULT '[]',
    medical_conditions TEXT NOT NULL DEFAULT '[]',
    diet_preferences   TEXT NOT NULL DEFAULT 'null',
    disliked_meals     TEXT NOT NULL DEFAULT '[]',
    disliked_workouts  TEXT NOT NULL DEFAULT '[]'
);

CREATE INDEX IF NOT EXISTS fact_sessions_user_day_idx
    ON fact_sessions(user_id, day_id, domain);
CREATE INDEX IF NOT EXISTS fact_sessions_recorded_idx
    ON fact_sessions(recorded_at);
CREATE INDEX IF NOT EXISTS plans_user_domain_idx
    ON plans(user_id, domain);

PRAGMA user_version = 1;
";
