//! Records and the per-channel history that owns them.
//!
//! A [`ChannelHistory`] is both the unit of storage and the unit of merge:
//! stores persist one per channel id and append to it on every crawl.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::query::DateRange;

/// Identifier assigned by the source; strictly increasing in post order.
pub type RecordId = u64;

/// One immutable message posted in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  pub id:      RecordId,
  pub date:    DateTime<Utc>,
  pub content: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image:   Option<String>,
}

/// Channel-level fields scraped alongside the records.
///
/// An empty string means the value is not known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelMetadata {
  pub name:      String,
  pub image_url: String,
}

impl ChannelMetadata {
  /// Overwrite every field for which `fresh` carries a non-empty value.
  pub fn refresh(&mut self, fresh: ChannelMetadata) {
    if !fresh.name.is_empty() {
      self.name = fresh.name;
    }
    if !fresh.image_url.is_empty() {
      self.image_url = fresh.image_url;
    }
  }
}

/// Everything cached for one channel, in id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHistory {
  pub channel_id: String,
  #[serde(default)]
  pub metadata:   ChannelMetadata,
  #[serde(default)]
  pub records:    Vec<Record>,
}

impl ChannelHistory {
  pub fn new(
    channel_id: impl Into<String>,
    metadata: ChannelMetadata,
    records: Vec<Record>,
  ) -> Self {
    Self { channel_id: channel_id.into(), metadata, records }
  }

  /// Append `records` in call order and refresh stale metadata.
  ///
  /// No sorting and no de-duplication takes place: callers must only hand in
  /// records newer than [`ChannelHistory::latest`].
  pub fn merge(&mut self, metadata: ChannelMetadata, records: Vec<Record>) {
    self.metadata.refresh(metadata);
    self.records.extend(records);
  }

  /// The most recently posted record, if any.
  pub fn latest(&self) -> Option<&Record> { self.records.last() }

  /// An independent copy holding only the records strictly inside `range`.
  pub fn filtered(&self, range: &DateRange) -> ChannelHistory {
    ChannelHistory {
      channel_id: self.channel_id.clone(),
      metadata:   self.metadata.clone(),
      records:    self
        .records
        .iter()
        .filter(|r| range.contains(r.date))
        .cloned()
        .collect(),
    }
  }
}
