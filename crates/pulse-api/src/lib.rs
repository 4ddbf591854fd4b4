//! JSON REST API for Pulse.
//!
//! Exposes an axum [`Router`] backed by any storage backend and
//! collaborator pair. Auth, TLS, and transport concerns are the caller's
//! responsibility; dates arrive as `YYYY-MM-DD` strings already in the
//! reference timezone.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pulse_api::api_router(state.clone()))
//! ```

pub mod error;
pub mod facts;
pub mod metrics;
pub mod plans;
pub mod profiles;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use pulse_core::{
  clock::Clock, collab::{PlanGenerator, ScoreEngine}, facts::FactStore, store::HealthStore,
};
use pulse_metrics::MonthlyMetricCache;
use pulse_plan::PlanService;

pub use error::ApiError;

/// Everything the handlers need, shared behind one [`Arc`].
pub struct ApiState<S, F, E, G, C> {
  pub metrics: MonthlyMetricCache<S, F, E, C>,
  pub plans:   PlanService<S, G>,
  pub store:   S,
  pub clock:   C,
}

/// Assemble the API router over `state`.
///
/// State is applied here, so the result nests into a parent router of
/// any state type.
pub fn api_router<S, F, E, G, C>(state: Arc<ApiState<S, F, E, G, C>>) -> Router<()>
where
  S: HealthStore + 'static,
  F: FactStore + 'static,
  E: ScoreEngine + 'static,
  G: PlanGenerator + 'static,
  C: Clock + 'static,
{
  Router::new()
    // Metrics
    .route(
      "/metrics/daily/{user_id}/{date}/{kind}",
      get(metrics::daily::<S, F, E, G, C>),
    )
    .route(
      "/metrics/monthly/{user_id}/{year}/{month}/{domain}",
      get(metrics::monthly::<S, F, E, G, C>),
    )
    // Plans
    .route(
      "/plans/{user_id}/{date}/{domain}",
      get(plans::get_one::<S, F, E, G, C>),
    )
    .route(
      "/plans/{user_id}/{date}/{domain}/regenerate",
      post(plans::regenerate::<S, F, E, G, C>),
    )
    // Facts
    .route(
      "/facts/{user_id}/{date}/{domain}",
      post(facts::ingest::<S, F, E, G, C>),
    )
    // Profiles
    .route("/profiles", post(profiles::create::<S, F, E, G, C>))
    .route(
      "/profiles/{user_id}",
      get(profiles::get_one::<S, F, E, G, C>).put(profiles::update::<S, F, E, G, C>),
    )
    .with_state(state)
}
