//! The handler error type and its status-code mapping.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// What a handler returns when a request cannot be served.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A dependency (collaborator or temporal resolution) failed in a way
  /// that is safe to retry.
  #[error("temporarily unavailable: {0}")]
  Unavailable(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<pulse_core::Error> for ApiError {
  fn from(e: pulse_core::Error) -> Self {
    use pulse_core::Error;
    match &e {
      Error::InvalidDate(_) => ApiError::BadRequest(e.to_string()),
      Error::ProfileNotFound(_) | Error::PlanNotFound { .. } => {
        ApiError::NotFound(e.to_string())
      }
      _ if e.is_retryable() => ApiError::Unavailable(e.to_string()),
      _ => ApiError::Internal(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unavailable(m) => (StatusCode::SERVICE_UNAVAILABLE, m.clone()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use pulse_core::{metric::ScoreKind, plan::PlanDomain};
  use uuid::Uuid;

  use super::*;

  #[test]
  fn retryable_errors_map_to_unavailable() {
    let scoring = pulse_core::Error::Scoring {
      kind:   ScoreKind::Sleep,
      source: "offline".into(),
    };
    assert!(matches!(ApiError::from(scoring), ApiError::Unavailable(_)));

    let temporal = pulse_core::Error::TemporalResolution { year: 2024, month: 6, day: 10 };
    assert!(matches!(ApiError::from(temporal), ApiError::Unavailable(_)));
  }

  #[test]
  fn lookup_failures_map_to_not_found() {
    let profile = pulse_core::Error::ProfileNotFound(Uuid::new_v4());
    assert!(matches!(ApiError::from(profile), ApiError::NotFound(_)));

    let plan = pulse_core::Error::PlanNotFound {
      user_id: Uuid::new_v4(),
      date:    chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
      domain:  PlanDomain::Diet,
    };
    assert!(matches!(ApiError::from(plan), ApiError::NotFound(_)));
  }

  #[test]
  fn invalid_dates_map_to_bad_request() {
    let e = pulse_core::Error::InvalidDate("2024-13-40".into());
    assert!(matches!(ApiError::from(e), ApiError::BadRequest(_)));
  }
}
