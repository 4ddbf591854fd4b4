//! Core types and trait contracts for the Pulse metric cache and plan
//! scheduler.
//!
//! No HTTP, no database: everything here is plain domain vocabulary plus
//! the async trait seams ([`store::HealthStore`], [`facts::FactStore`],
//! [`collab`]) the other crates plug into.

// Trait methods return `impl Future + Send` and backends implement them
// with plain `async fn`; quiet the advisory lint that pairing triggers.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod collab;
pub mod date;
pub mod error;
pub mod facts;
pub mod metric;
pub mod plan;
pub mod profile;
pub mod rollup;
pub mod store;

pub use error::{BoxError, Error, Result};
