//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; histories as compact JSON.

use chanlog_core::history::{ChannelHistory, ChannelMetadata, Record};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ChannelHistory ──────────────────────────────────────────────────────────

pub fn encode_history(history: &ChannelHistory) -> Result<String> {
  Ok(serde_json::to_string(history)?)
}

/// Decode the blob stored under `key`, checking it belongs to that channel.
pub fn decode_history(key: &str, json: &str) -> Result<ChannelHistory> {
  let history: ChannelHistory = serde_json::from_str(json)?;
  if history.channel_id != key {
    return Err(Error::KeyMismatch {
      key:   key.to_owned(),
      found: history.channel_id,
    });
  }
  Ok(history)
}

/// Apply a merge to the (possibly absent) stored blob and re-encode it.
///
/// Returns the new blob and its record count.
pub fn merge_blob(
  key: &str,
  existing: Option<&str>,
  metadata: ChannelMetadata,
  records: Vec<Record>,
) -> Result<(String, usize)> {
  let mut history = match existing {
    Some(json) => decode_history(key, json)?,
    None => ChannelHistory::new(key, ChannelMetadata::default(), Vec::new()),
  };
  history.merge(metadata, records);
  Ok((encode_history(&history)?, history.records.len()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Summary of one cached channel, without its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedChannel {
  pub channel_id: String,
  pub updated_at: DateTime<Utc>,
}
