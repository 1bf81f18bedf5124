//! SQLite backend for the Shelf lending tracker.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Borrow and return execute as
//! single transactions, and the at-most-one-active-loan-per-book rule is a
//! partial unique index enforced by SQLite itself.

mod encode;
mod schema;
mod store;

pub use store::SqliteStore;
