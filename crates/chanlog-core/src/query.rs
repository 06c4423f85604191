//! Query parameters and their resolution into a concrete date range.

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Parameters for
/// [`SyncEngine::query_channel_history`](crate::sync::SyncEngine::query_channel_history).
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
  /// Lower bound (exclusive). Defaults to the Unix epoch.
  pub from:            Option<DateTime<Utc>>,
  /// Upper bound (exclusive). Defaults to the time the query starts.
  pub to:              Option<DateTime<Utc>>,
  /// Whether the engine may crawl to fill gaps in the cache.
  pub fetch_as_needed: bool,
}

impl HistoryQuery {
  /// Apply defaults and validate the interval.
  ///
  /// `now` is taken once by the caller so that every step of a query sees the
  /// same snapshot.
  pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateRange> {
    let from = self.from.unwrap_or(DateTime::UNIX_EPOCH);
    let to = self.to.unwrap_or(now);

    if from > to {
      return Err(Error::InvalidRange { from, to });
    }

    Ok(DateRange { from, to })
  }
}

/// A resolved, validated interval. Both ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  pub from: DateTime<Utc>,
  pub to:   DateTime<Utc>,
}

impl DateRange {
  pub fn contains(&self, date: DateTime<Utc>) -> bool {
    date > self.from && date < self.to
  }
}
