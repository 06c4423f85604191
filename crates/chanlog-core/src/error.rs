//! Error types for `chanlog-core`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::crawl::Cursor;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("fromDate {from} is after toDate {to}")]
  InvalidRange {
    from: DateTime<Utc>,
    to:   DateTime<Utc>,
  },

  #[error("found no messages in given range for channel {0:?}")]
  NoMessagesInRange(String),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("crawl of {channel:?} ({cursor}) failed: {source}")]
  Crawl {
    channel: String,
    cursor:  Cursor,
    #[source]
    source:  BoxError,
  },

  /// The crawler kept returning pages past the configured cap.
  #[error("backfill of {channel:?} stopped after {pages} pages")]
  BackfillLimit { channel: String, pages: usize },

  /// The crawler returned records that are not newer than the cursor.
  #[error("crawler did not advance past {cursor} for channel {channel:?}")]
  CursorNotAdvanced { channel: String, cursor: Cursor },
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  /// `true` for outcomes a caller should report as a normal answer rather
  /// than a fault.
  pub fn is_expected(&self) -> bool {
    matches!(self, Self::InvalidRange { .. } | Self::NoMessagesInRange(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
