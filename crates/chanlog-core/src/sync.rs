//! [`SyncEngine`] — answers range queries from the cache, crawling to fill
//! gaps when the caller allows it.
//!
//! A query reads the cached history once, then backfills page by page with a
//! cursor taken from the newest cached record until the cache covers the
//! requested upper bound or the crawler reports [`CrawlOutcome::NoNewData`].
//! Round trips within one query are strictly sequential: each cursor depends
//! on the previous merge.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use crate::{
  Error, Result,
  crawl::{CrawlOutcome, Crawler, Cursor, Page},
  history::ChannelHistory,
  query::{DateRange, HistoryQuery},
  store::HistoryStore,
};

/// Tuning for the backfill loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Maximum number of pages a single query may fetch during backfill.
  pub max_backfill_pages: usize,
}

impl Default for SyncConfig {
  fn default() -> Self { Self { max_backfill_pages: 200 } }
}

/// Orchestrates a [`HistoryStore`] and a [`Crawler`].
///
/// Holds no cached state of its own; every query starts from the store.
pub struct SyncEngine<S, C> {
  store:   Arc<S>,
  crawler: Arc<C>,
  config:  SyncConfig,
}

impl<S, C> SyncEngine<S, C>
where
  S: HistoryStore,
  C: Crawler,
{
  pub fn new(store: Arc<S>, crawler: Arc<C>, config: SyncConfig) -> Self {
    Self { store, crawler, config }
  }

  #[cfg(test)]
  pub(crate) fn crawler(&self) -> &Arc<C> { &self.crawler }

  /// Return the cached records of `channel_id` that fall strictly inside the
  /// query's range, crawling first if the cache may be missing some.
  ///
  /// The returned history is an independent copy; the cache is never
  /// modified by filtering.
  pub async fn query_channel_history(
    &self,
    channel_id: &str,
    query: HistoryQuery,
  ) -> Result<ChannelHistory> {
    let now = Utc::now();
    let range = query.resolve(now)?;

    tracing::debug!(
      channel = channel_id,
      from = %range.from,
      to = %range.to,
      fetch_as_needed = query.fetch_as_needed,
      "querying channel history"
    );

    let history = match self.load(channel_id).await? {
      Some(history) => {
        self
          .backfill(channel_id, history, &range, query.fetch_as_needed)
          .await?
      }
      None if query.fetch_as_needed => self.initial_crawl(channel_id, &range).await?,
      None => return Err(Error::NoMessagesInRange(channel_id.to_owned())),
    };

    let filtered = history.filtered(&range);
    tracing::info!(
      channel = channel_id,
      cached = history.records.len(),
      returned = filtered.records.len(),
      "answered channel history query"
    );
    Ok(filtered)
  }

  /// First crawl of a channel that has never been cached.
  async fn initial_crawl(
    &self,
    channel_id: &str,
    range: &DateRange,
  ) -> Result<ChannelHistory> {
    match self.crawl(channel_id, Cursor::Latest, range).await? {
      CrawlOutcome::Page(page) if !page.records.is_empty() => {
        self.save(channel_id, page).await?;
        self
          .load(channel_id)
          .await?
          .ok_or_else(|| Error::NoMessagesInRange(channel_id.to_owned()))
      }
      _ => Err(Error::NoMessagesInRange(channel_id.to_owned())),
    }
  }

  /// Extend `history` until its newest record is after `range.to` or the
  /// source runs dry.
  async fn backfill(
    &self,
    channel_id: &str,
    mut history: ChannelHistory,
    range: &DateRange,
    fetch_as_needed: bool,
  ) -> Result<ChannelHistory> {
    let mut pages = 0;

    loop {
      let cursor = match history.latest() {
        Some(latest) if latest.date > range.to => break,
        Some(latest) => Cursor::After(latest.id),
        None => Cursor::Latest,
      };

      if !fetch_as_needed {
        return Err(Error::NoMessagesInRange(channel_id.to_owned()));
      }

      if pages >= self.config.max_backfill_pages {
        tracing::warn!(
          channel = channel_id,
          %cursor,
          pages,
          "backfill page limit reached"
        );
        return Err(Error::BackfillLimit { channel: channel_id.to_owned(), pages });
      }

      let page = match self.crawl(channel_id, cursor, range).await? {
        CrawlOutcome::Page(page) if !page.records.is_empty() => page,
        _ => {
          tracing::debug!(channel = channel_id, %cursor, pages, "no new data");
          break;
        }
      };

      if let Cursor::After(after) = cursor
        && page.records.iter().any(|r| r.id <= after)
      {
        tracing::error!(
          channel = channel_id,
          %cursor,
          "crawler returned records at or before the cursor"
        );
        return Err(Error::CursorNotAdvanced { channel: channel_id.to_owned(), cursor });
      }

      self.save(channel_id, page).await?;
      pages += 1;

      history = self
        .load(channel_id)
        .await?
        .ok_or_else(|| Error::NoMessagesInRange(channel_id.to_owned()))?;
    }

    Ok(history)
  }

  async fn crawl(
    &self,
    channel_id: &str,
    cursor: Cursor,
    range: &DateRange,
  ) -> Result<CrawlOutcome> {
    tracing::info!(channel = channel_id, %cursor, "crawling channel page");

    self.crawler.fetch(channel_id, cursor).await.map_err(|e| {
      tracing::error!(
        channel = channel_id,
        %cursor,
        from = %range.from,
        to = %range.to,
        error = %e,
        "crawl failed"
      );
      Error::Crawl {
        channel: channel_id.to_owned(),
        cursor,
        source: Box::new(e),
      }
    })
  }

  async fn load(&self, channel_id: &str) -> Result<Option<ChannelHistory>> {
    self.store.get(channel_id).await.map_err(|e| {
      tracing::error!(channel = channel_id, error = %e, "failed to read cache");
      Error::store(e)
    })
  }

  async fn save(&self, channel_id: &str, page: Page) -> Result<()> {
    tracing::info!(channel = channel_id, records = page.records.len(), "saving records");

    self
      .store
      .merge(channel_id, page.metadata, page.records)
      .await
      .map_err(|e| {
        tracing::error!(channel = channel_id, error = %e, "failed to merge into cache");
        Error::store(e)
      })
  }
}
