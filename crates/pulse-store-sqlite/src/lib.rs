//! SQLite backend for the Pulse health store.
//!
//! Database access goes through [`tokio_rusqlite`], which keeps rusqlite
//! calls off the async runtime's worker threads.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
