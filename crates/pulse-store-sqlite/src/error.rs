//! Error type for `pulse-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown domain discriminant: {0:?}")]
  UnknownDomain(String),

  /// The day-key chain could not be resolved even after a retry.
  #[error("could not resolve temporal key for {year:04}-{month:02}-{day:02}")]
  TemporalResolution { year: i32, month: u32, day: u32 },
}

impl From<Error> for pulse_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::TemporalResolution { year, month, day } => {
        pulse_core::Error::TemporalResolution { year, month, day }
      }
      Error::Json(e) => pulse_core::Error::Serialization(e),
      other => pulse_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
