//! Injected clock, pinned to the reference timezone.
//!
//! Every "is this date today?" decision in the caches and the scheduler goes
//! through a [`Clock`], never through wall-clock time directly, so tests can
//! simulate arbitrary dates deterministically.

use std::sync::Mutex;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Utc};

/// A source of "now" in the reference timezone.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<FixedOffset>;

  /// Today's calendar date in the reference timezone.
  fn today(&self) -> NaiveDate { self.now().date_naive() }

  /// The current (year, month) in the reference timezone.
  fn current_month(&self) -> (i32, u32) {
    let today = self.today();
    (today.year(), today.month())
  }

  fn now_utc(&self) -> DateTime<Utc> { self.now().with_timezone(&Utc) }
}

// ─── ReferenceClock ──────────────────────────────────────────────────────────

/// Wall-clock time shifted into a fixed reference offset.
///
/// The default offset is UTC+05:30, matching the deployment's reference
/// timezone. No DST handling: the offset is fixed by definition.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceClock {
  offset: FixedOffset,
}

/// UTC+05:30 in seconds.
pub const DEFAULT_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

impl ReferenceClock {
  pub fn new(offset: FixedOffset) -> Self { Self { offset } }

  /// Construct from an offset east of UTC in whole seconds.
  pub fn from_offset_secs(secs: i32) -> Option<Self> {
    FixedOffset::east_opt(secs).map(Self::new)
  }
}

impl Default for ReferenceClock {
  fn default() -> Self {
    Self::new(FixedOffset::east_opt(DEFAULT_OFFSET_SECS).expect("valid offset"))
  }
}

impl Clock for ReferenceClock {
  fn now(&self) -> DateTime<FixedOffset> { Utc::now().with_timezone(&self.offset) }
}

// ─── FixedClock ──────────────────────────────────────────────────────────────

/// A settable clock for tests: "today" is whatever the test says it is.
pub struct FixedClock {
  now: Mutex<DateTime<FixedOffset>>,
}

impl FixedClock {
  pub fn at(now: DateTime<FixedOffset>) -> Self { Self { now: Mutex::new(now) } }

  /// Midday on `date` in the default reference offset.
  pub fn on(date: NaiveDate) -> Self {
    let offset = FixedOffset::east_opt(DEFAULT_OFFSET_SECS).expect("valid offset");
    let noon = date
      .and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"))
      .and_local_timezone(offset)
      .single()
      .expect("unambiguous local time");
    Self::at(noon)
  }

  pub fn set(&self, now: DateTime<FixedOffset>) {
    *self.now.lock().expect("clock lock") = now;
  }

  /// Move the clock forward by whole days, keeping the time of day.
  pub fn advance_days(&self, days: i64) {
    let mut now = self.now.lock().expect("clock lock");
    *now += chrono::Duration::days(days);
  }
}

impl Clock for FixedClock {
  fn now(&self) -> DateTime<FixedOffset> { *self.now.lock().expect("clock lock") }
}
