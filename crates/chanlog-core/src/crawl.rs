//! The `Crawler` trait and the outcome of a single page fetch.
//!
//! Implemented by `chanlog-crawler`; the engine drives pagination by calling
//! [`Crawler::fetch`] repeatedly with an advancing [`Cursor`].

use std::{fmt, future::Future};

use crate::history::{ChannelMetadata, Record, RecordId};

/// Pagination position for a single fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
  /// The most recent page.
  Latest,
  /// Only records posted after this id.
  After(RecordId),
  /// Only records posted before this id.
  Before(RecordId),
}

impl fmt::Display for Cursor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cursor::Latest => f.write_str("latest"),
      Cursor::After(id) => write!(f, "after {id}"),
      Cursor::Before(id) => write!(f, "before {id}"),
    }
  }
}

/// One batch of records plus the channel metadata seen on the same page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
  pub metadata: ChannelMetadata,
  /// Ordered by id.
  pub records:  Vec<Record>,
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
  Page(Page),
  /// The source has nothing beyond the cursor. Not an error.
  NoNewData,
}

/// Abstraction over a paginated external source of channel records.
pub trait Crawler: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch one page for `channel_id` starting at `cursor`.
  ///
  /// Implementations return at most one bounded batch and must only return
  /// records strictly beyond the cursor. Malformed records fail the whole
  /// fetch; partial batches are never returned.
  fn fetch<'a>(
    &'a self,
    channel_id: &'a str,
    cursor: Cursor,
  ) -> impl Future<Output = Result<CrawlOutcome, Self::Error>> + Send + 'a;
}
