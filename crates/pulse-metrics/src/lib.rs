//! Read-through metric caches.
//!
//! [`DailyMetricCache`] serves per-day scores, recomputing from raw facts
//! only when the cached value is missing or the requested date is "today"
//! in the reference timezone. [`MonthlyMetricCache`] serves per-month
//! rollups, rebuilding when the month is current or when newer facts have
//! arrived since the rollup was cached.
//!
//! Both caches are generic over the storage backend, the fact reader, the
//! scoring collaborator, and the clock, so they can be tested against an
//! in-memory store and a fixed clock.

mod daily;
mod monthly;

pub use daily::DailyMetricCache;
pub use monthly::MonthlyMetricCache;

/// Wrap a fact-store or collaborator error into the shared taxonomy.
pub(crate) fn store_err<E>(e: E) -> pulse_core::Error
where E: std::error::Error + Send + Sync + 'static {
  pulse_core::Error::Store(Box::new(e))
}
