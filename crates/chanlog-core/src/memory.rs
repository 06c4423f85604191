//! [`MemoryStore`] — a process-local [`HistoryStore`].

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::{
  history::{ChannelHistory, ChannelMetadata, Record},
  store::HistoryStore,
};

/// A history store held entirely in memory.
///
/// Cloning is cheap — clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Mutex<HashMap<String, ChannelHistory>>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Seed the store with a complete history, replacing any existing entry.
  pub fn insert(&self, history: ChannelHistory) {
    self.lock().insert(history.channel_id.clone(), history);
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, ChannelHistory>> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl HistoryStore for MemoryStore {
  type Error = Infallible;

  async fn get(&self, channel_id: &str) -> Result<Option<ChannelHistory>, Infallible> {
    Ok(self.lock().get(channel_id).cloned())
  }

  async fn merge(
    &self,
    channel_id: &str,
    metadata: ChannelMetadata,
    records: Vec<Record>,
  ) -> Result<(), Infallible> {
    self
      .lock()
      .entry(channel_id.to_owned())
      .or_insert_with(|| {
        ChannelHistory::new(channel_id, ChannelMetadata::default(), Vec::new())
      })
      .merge(metadata, records);
    Ok(())
  }

  async fn close(self) -> Result<(), Infallible> { Ok(()) }
}
