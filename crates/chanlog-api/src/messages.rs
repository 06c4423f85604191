//! Handler for `GET /channels/{channel_id}/messages`.
//!
//! | Param | Notes |
//! |-------|-------|
//! | `fromDateUTC` | Unix epoch seconds, exclusive; defaults to the epoch |
//! | `toDateUTC` | Unix epoch seconds, exclusive; defaults to now |
//! | `fetch` | `false` answers from the cache only; default `true` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chanlog_core::{
  crawl::Crawler,
  history::{ChannelHistory, Record},
  query::HistoryQuery,
  store::HistoryStore,
  sync::SyncEngine,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

const FROM_DATE_PARAM: &str = "fromDateUTC";
const TO_DATE_PARAM: &str = "toDateUTC";
const FETCH_PARAM: &str = "fetch";

// ─── Request ──────────────────────────────────────────────────────────────────

/// Raw query parameters. Kept as strings so malformed values surface as an
/// [`ApiError::BadRequest`] JSON body rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesParams {
  #[serde(rename = "fromDateUTC")]
  pub from_date_utc: Option<String>,
  #[serde(rename = "toDateUTC")]
  pub to_date_utc:   Option<String>,
  /// Whether the server may crawl to fill gaps in the cache; default `true`.
  pub fetch:         Option<String>,
}

impl MessagesParams {
  fn into_query(self) -> Result<HistoryQuery, ApiError> {
    Ok(HistoryQuery {
      from:            self
        .from_date_utc
        .map(|raw| parse_epoch(&raw, FROM_DATE_PARAM))
        .transpose()?,
      to:              self
        .to_date_utc
        .map(|raw| parse_epoch(&raw, TO_DATE_PARAM))
        .transpose()?,
      fetch_as_needed: self
        .fetch
        .map(|raw| parse_flag(&raw, FETCH_PARAM))
        .transpose()?
        .unwrap_or(true),
    })
  }
}

fn parse_epoch(raw: &str, param: &str) -> Result<DateTime<Utc>, ApiError> {
  raw
    .trim()
    .parse::<i64>()
    .ok()
    .and_then(|secs| DateTime::from_timestamp(secs, 0))
    .ok_or_else(|| ApiError::BadRequest(format!("{param:?} needs to be a unix epoch")))
}

fn parse_flag(raw: &str, param: &str) -> Result<bool, ApiError> {
  raw
    .trim()
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("{param:?} needs to be true or false")))
}

/// Channel usernames: ASCII letters, digits and underscores.
fn validate_channel_id(channel_id: &str) -> Result<(), ApiError> {
  let valid = !channel_id.is_empty()
    && channel_id.len() <= 64
    && channel_id
      .bytes()
      .all(|b| b.is_ascii_alphanumeric() || b == b'_');

  if valid {
    Ok(())
  } else {
    Err(ApiError::BadRequest(format!("invalid channel id {channel_id:?}")))
  }
}

// ─── Response ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagesResponse {
  pub channel:  ChannelBody,
  pub messages: Vec<MessageBody>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelBody {
  pub username: String,
  pub name:     String,
  pub image:    String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
  pub id:         String,
  pub date_epoch: i64,
  pub content:    String,
  pub image:      Option<String>,
}

impl From<Record> for MessageBody {
  fn from(r: Record) -> Self {
    MessageBody {
      id:         r.id.to_string(),
      date_epoch: r.date.timestamp(),
      content:    r.content,
      image:      r.image,
    }
  }
}

impl From<ChannelHistory> for MessagesResponse {
  fn from(h: ChannelHistory) -> Self {
    MessagesResponse {
      channel:  ChannelBody {
        username: h.channel_id,
        name:     h.metadata.name,
        image:    h.metadata.image_url,
      },
      messages: h.records.into_iter().map(MessageBody::from).collect(),
    }
  }
}

// ─── Handler ──────────────────────────────────────────────────────────────────

/// `GET /channels/{channel_id}/messages[?fromDateUTC=...][&toDateUTC=...][&fetch=...]`
pub async fn list<S, C>(
  State(engine): State<Arc<SyncEngine<S, C>>>,
  Path(channel_id): Path<String>,
  Query(params): Query<MessagesParams>,
) -> Result<Json<MessagesResponse>, ApiError>
where
  S: HistoryStore,
  C: Crawler,
{
  validate_channel_id(&channel_id)?;
  let query = params.into_query()?;

  let history = engine
    .query_channel_history(&channel_id, query)
    .await
    .inspect_err(|e| {
      if !e.is_expected() {
        tracing::error!(channel = %channel_id, error = %e, "channel history query failed");
      }
    })?;

  Ok(Json(MessagesResponse::from(history)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn channel_id_validation() {
    assert!(validate_channel_id("durov").is_ok());
    assert!(validate_channel_id("some_channel_42").is_ok());
    assert!(validate_channel_id("").is_err());
    assert!(validate_channel_id("../etc").is_err());
    assert!(validate_channel_id("a?after=1").is_err());
    assert!(validate_channel_id(&"x".repeat(65)).is_err());
  }

  #[test]
  fn omitted_params_use_defaults() {
    let query = MessagesParams::default().into_query().unwrap();
    assert!(query.from.is_none());
    assert!(query.to.is_none());
    assert!(query.fetch_as_needed);
  }

  #[test]
  fn explicit_params_are_parsed() {
    let params = MessagesParams {
      from_date_utc: Some("100".into()),
      to_date_utc:   Some(" 200 ".into()),
      fetch:         Some("false".into()),
    };
    let query = params.into_query().unwrap();
    assert_eq!(query.from.unwrap().timestamp(), 100);
    assert_eq!(query.to.unwrap().timestamp(), 200);
    assert!(!query.fetch_as_needed);
  }

  #[test]
  fn out_of_range_epoch_is_bad_request() {
    let params = MessagesParams { from_date_utc: Some(i64::MAX.to_string()), ..Default::default() };
    assert!(matches!(params.into_query(), Err(ApiError::BadRequest(_))));
  }

  #[test]
  fn malformed_params_name_the_parameter() {
    let params = MessagesParams { to_date_utc: Some("yesterday".into()), ..Default::default() };
    let Err(ApiError::BadRequest(msg)) = params.into_query() else {
      panic!("expected bad request");
    };
    assert_eq!(msg, r#""toDateUTC" needs to be a unix epoch"#);

    let params = MessagesParams { fetch: Some("maybe".into()), ..Default::default() };
    assert!(matches!(params.into_query(), Err(ApiError::BadRequest(_))));
  }
}
