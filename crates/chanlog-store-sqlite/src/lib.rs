//! SQLite backend for the chanlog history cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Each channel is one row holding the
//! whole serialised [`ChannelHistory`](chanlog_core::history::ChannelHistory).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use encode::CachedChannel;
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
