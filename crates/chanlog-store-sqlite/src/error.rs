//! Error type for `chanlog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The stored blob belongs to a different channel than its key.
  #[error("history stored under {key:?} belongs to {found:?}")]
  KeyMismatch { key: String, found: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
