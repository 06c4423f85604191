//! Integration tests for `SqliteStore` against in-memory and on-disk databases.

use chanlog_core::{
  history::{ChannelMetadata, Record, RecordId},
  store::HistoryStore,
};
use chrono::{DateTime, Duration, TimeZone as _, Utc};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(id: RecordId) -> DateTime<Utc> {
  Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::hours(id as i64)
}

fn record(id: RecordId) -> Record {
  Record {
    id,
    date:    at(id),
    content: format!("post {id}"),
    image:   (id % 2 == 0).then(|| format!("https://cdn.example/{id}.jpg")),
  }
}

fn metadata(name: &str) -> ChannelMetadata {
  ChannelMetadata { name: name.into(), image_url: format!("https://cdn.example/{name}.jpg") }
}

fn ids(records: &[Record]) -> Vec<RecordId> { records.iter().map(|r| r.id).collect() }

// ─── Get ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get("nobody").await.unwrap().is_none());
}

// ─── Merge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn merge_creates_entry() {
  let s = store().await;
  s.merge("news", metadata("News"), vec![record(1), record(2)])
    .await
    .unwrap();

  let history = s.get("news").await.unwrap().unwrap();
  assert_eq!(history.channel_id, "news");
  assert_eq!(history.metadata, metadata("News"));
  assert_eq!(history.records, vec![record(1), record(2)]);
}

#[tokio::test]
async fn merge_appends_in_call_order() {
  let s = store().await;
  s.merge("news", metadata("News"), vec![record(1), record(2)])
    .await
    .unwrap();
  s.merge("news", metadata("News"), vec![record(3)])
    .await
    .unwrap();
  s.merge("news", metadata("News"), vec![record(4), record(5)])
    .await
    .unwrap();

  let history = s.get("news").await.unwrap().unwrap();
  assert_eq!(ids(&history.records), [1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn merge_does_not_deduplicate_overlapping_batches() {
  let s = store().await;
  s.merge("news", metadata("News"), vec![record(1), record(2)])
    .await
    .unwrap();
  s.merge("news", metadata("News"), vec![record(2), record(3)])
    .await
    .unwrap();

  let history = s.get("news").await.unwrap().unwrap();
  assert_eq!(ids(&history.records), [1, 2, 2, 3]);
}

#[tokio::test]
async fn merge_refreshes_only_non_empty_metadata() {
  let s = store().await;
  s.merge("news", ChannelMetadata::default(), vec![record(1)])
    .await
    .unwrap();
  s.merge("news", metadata("News"), vec![]).await.unwrap();
  s.merge(
    "news",
    ChannelMetadata { name: "Renamed".into(), image_url: String::new() },
    vec![],
  )
  .await
  .unwrap();

  let history = s.get("news").await.unwrap().unwrap();
  assert_eq!(history.metadata.name, "Renamed");
  assert_eq!(history.metadata.image_url, "https://cdn.example/News.jpg");
  assert_eq!(ids(&history.records), [1]);
}

#[tokio::test]
async fn channels_are_isolated() {
  let s = store().await;
  s.merge("a", metadata("A"), vec![record(1)]).await.unwrap();
  s.merge("b", metadata("B"), vec![record(10), record(11)])
    .await
    .unwrap();

  assert_eq!(ids(&s.get("a").await.unwrap().unwrap().records), [1]);
  assert_eq!(ids(&s.get("b").await.unwrap().unwrap().records), [10, 11]);
}

#[tokio::test]
async fn list_channels_is_sorted_and_stamped() {
  let s = store().await;
  assert!(s.list_channels().await.unwrap().is_empty());

  let before = Utc::now() - Duration::seconds(1);
  s.merge("zeta", metadata("Z"), vec![record(1)]).await.unwrap();
  s.merge("alpha", metadata("A"), vec![record(1), record(2)])
    .await
    .unwrap();
  s.merge("alpha", metadata("A"), vec![record(3)]).await.unwrap();

  let channels = s.list_channels().await.unwrap();
  let ids: Vec<_> = channels.iter().map(|c| c.channel_id.as_str()).collect();
  assert_eq!(ids, ["alpha", "zeta"]);
  assert!(channels.iter().all(|c| c.updated_at >= before));
}

// ─── Corruption ──────────────────────────────────────────────────────────────

const FOREIGN_BLOB: &str = r#"{"channel_id":"b","records":[]}"#;

async fn raw_blob(s: &SqliteStore, key: &'static str) -> String {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(
        "SELECT history_json FROM channel_histories WHERE channel_id = ?1",
        [key],
        |row| row.get(0),
      )?)
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn blob_under_wrong_key_is_rejected() {
  let s = store().await;
  s.conn
    .call(|conn| {
      conn.execute(
        "INSERT INTO channel_histories (channel_id, history_json, updated_at)
         VALUES ('a', ?1, '2024-01-01T00:00:00Z')",
        [FOREIGN_BLOB],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(matches!(s.get("a").await, Err(Error::KeyMismatch { .. })));
  assert!(matches!(
    s.merge("a", metadata("A"), vec![record(1)]).await,
    Err(Error::KeyMismatch { .. })
  ));
  assert_eq!(raw_blob(&s, "a").await, FOREIGN_BLOB);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn history_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("chanlog.db");

  let s = SqliteStore::open(&path).await.unwrap();
  s.merge("news", metadata("News"), vec![record(1), record(2)])
    .await
    .unwrap();
  s.close().await.unwrap();

  let reopened = SqliteStore::open(&path).await.unwrap();
  let history = reopened.get("news").await.unwrap().unwrap();
  assert_eq!(history.records, vec![record(1), record(2)]);
  reopened.close().await.unwrap();
}
