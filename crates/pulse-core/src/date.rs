//! Calendar-date parsing helpers.
//!
//! Callers hand this subsystem dates already normalised to `YYYY-MM-DD` in
//! the reference timezone; we only parse and split them.

use chrono::{Datelike, NaiveDate};

use crate::{Error, Result};

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// The (year, month, day) triple of a date, month and day 1-based.
pub fn date_parts(date: NaiveDate) -> (i32, u32, u32) {
  (date.year(), date.month(), date.day())
}
