//! The `HistoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `chanlog-store-sqlite`
//! and [`MemoryStore`](crate::memory::MemoryStore)). The engine depends on
//! this abstraction, not on any concrete backend.

use std::future::Future;

use crate::history::{ChannelHistory, ChannelMetadata, Record};

/// Abstraction over an append-only, per-channel history cache.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HistoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve the cached history for `channel_id`. Returns `None` if the
  /// channel has never been stored.
  fn get<'a>(
    &'a self,
    channel_id: &'a str,
  ) -> impl Future<Output = Result<Option<ChannelHistory>, Self::Error>> + Send + 'a;

  /// Append `records` to the stored history, creating it if absent.
  ///
  /// Non-empty `metadata` fields replace the stored ones. The whole merge is
  /// atomic with respect to other callers of the same store.
  fn merge<'a>(
    &'a self,
    channel_id: &'a str,
    metadata: ChannelMetadata,
    records: Vec<Record>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Release underlying resources.
  fn close(self) -> impl Future<Output = Result<(), Self::Error>> + Send
  where
    Self: Sized;
}
