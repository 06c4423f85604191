//! [`SqliteStore`] — the SQLite implementation of [`HistoryStore`].

use std::path::Path;

use chanlog_core::{
  history::{ChannelHistory, ChannelMetadata, Record},
  store::HistoryStore,
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{CachedChannel, decode_dt, decode_history, encode_dt, merge_blob},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A channel-history cache backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Every cached channel, ordered by id, without loading the records.
  pub async fn list_channels(&self) -> Result<Vec<CachedChannel>> {
    let rows: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT channel_id, updated_at
           FROM channel_histories
           ORDER BY channel_id",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(channel_id, updated_at)| {
        Ok(CachedChannel { channel_id, updated_at: decode_dt(&updated_at)? })
      })
      .collect()
  }
}

// ─── HistoryStore impl ───────────────────────────────────────────────────────

impl HistoryStore for SqliteStore {
  type Error = Error;

  async fn get(&self, channel_id: &str) -> Result<Option<ChannelHistory>> {
    let key = channel_id.to_owned();

    let json: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT history_json FROM channel_histories WHERE channel_id = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    json
      .as_deref()
      .map(|json| decode_history(channel_id, json))
      .transpose()
  }

  async fn merge(
    &self,
    channel_id: &str,
    metadata: ChannelMetadata,
    records: Vec<Record>,
  ) -> Result<()> {
    let key = channel_id.to_owned();
    let appended = records.len();
    let at_str = encode_dt(Utc::now());

    // Read, merge and write back inside one transaction so no caller ever
    // observes a half-applied merge.
    let total = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT history_json FROM channel_histories WHERE channel_id = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?;

        let (json, total) = match merge_blob(&key, existing.as_deref(), metadata, records) {
          Ok(merged) => merged,
          Err(e) => return Ok(Err(e)),
        };

        tx.execute(
          "INSERT INTO channel_histories (channel_id, history_json, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (channel_id) DO UPDATE SET
             history_json = excluded.history_json,
             updated_at   = excluded.updated_at",
          rusqlite::params![key, json, at_str],
        )?;
        tx.commit()?;

        Ok(Ok(total))
      })
      .await??;

    tracing::debug!(channel = channel_id, appended, total, "merged channel history");
    Ok(())
  }

  async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }
}
