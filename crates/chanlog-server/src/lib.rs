//! HTTP server wiring for chanlog.
//!
//! Combines the JSON API from `chanlog-api` with bearer-token auth, request
//! tracing and a request timeout.

pub mod auth;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{Router, middleware};
use chanlog_core::{crawl::Crawler, store::HistoryStore, sync::{SyncConfig, SyncEngine}};
use chanlog_crawler::CrawlerConfig;
use serde::Deserialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use auth::{AuthConfig, require_token};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `CHANLOG_*` environment variables.
#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// argon2 PHC hash of the bearer token; auth is off when unset.
  pub api_token_hash:       Option<String>,
  /// Upper bound on a whole request, backfill included.
  pub request_timeout_secs: u64,
  pub crawler:              CrawlerConfig,
  pub sync:                 SyncConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                 "127.0.0.1".to_string(),
      port:                 8080,
      store_path:           PathBuf::from("chanlog.db"),
      api_token_hash:       None,
      request_timeout_secs: 120,
      crawler:              CrawlerConfig::default(),
      sync:                 SyncConfig::default(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`]: the API nested under `/api`, guarded by
/// `auth`.
pub fn router<S, C>(
  engine: Arc<SyncEngine<S, C>>,
  auth: Arc<AuthConfig>,
  request_timeout: Duration,
) -> Router
where
  S: HistoryStore + 'static,
  C: Crawler + 'static,
{
  Router::new()
    .nest("/api", chanlog_api::api_router(engine))
    .layer(middleware::from_fn_with_state(auth, require_token))
    .layer(TimeoutLayer::new(request_timeout))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chanlog_core::{
    history::{ChannelHistory, ChannelMetadata, Record},
    memory::MemoryStore,
  };
  use chanlog_crawler::TelegramCrawler;
  use chrono::{TimeZone as _, Utc};
  use tower::ServiceExt as _;

  use crate::auth::hash_token;

  /// Points at a closed port: any crawl attempt fails fast.
  fn unreachable_crawler() -> TelegramCrawler {
    TelegramCrawler::new(&CrawlerConfig {
      base_url: "http://127.0.0.1:9/".to_string(),
      timeout_secs: 1,
      ..CrawlerConfig::default()
    })
    .unwrap()
  }

  fn app(token: Option<&str>) -> Router {
    let store = MemoryStore::new();
    store.insert(ChannelHistory::new(
      "news",
      ChannelMetadata { name: "News".into(), image_url: String::new() },
      vec![Record {
        id:      1,
        date:    Utc.timestamp_opt(100, 0).unwrap(),
        content: "hello".into(),
        image:   None,
      }],
    ));

    let engine = SyncEngine::new(
      Arc::new(store),
      Arc::new(unreachable_crawler()),
      SyncConfig::default(),
    );
    let auth = AuthConfig { token_hash: token.map(|t| hash_token(t).unwrap()) };
    router(Arc::new(engine), Arc::new(auth), Duration::from_secs(5))
  }

  async fn send(app: Router, bearer: Option<&str>, uri: &str) -> axum::response::Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
  }

  /// Answered from the cache alone.
  const CACHED: &str = "/api/channels/news/messages?fromDateUTC=0&toDateUTC=50&fetch=false";
  /// Needs a crawl past the cached record.
  const STALE: &str = "/api/channels/news/messages?fromDateUTC=0&toDateUTC=1000";

  #[tokio::test]
  async fn authorised_request_reaches_api() {
    let resp = send(app(Some("s3cret")), Some("s3cret"), CACHED).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["channel"]["name"], "News");
    assert_eq!(body["messages"].as_array().unwrap().len(), 0);
  }

  #[tokio::test]
  async fn missing_token_is_unauthorized() {
    let resp = send(app(Some("s3cret")), None, CACHED).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
  }

  #[tokio::test]
  async fn wrong_token_is_unauthorized() {
    let resp = send(app(Some("s3cret")), Some("nope"), CACHED).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn auth_disabled_without_hash() {
    let resp = send(app(None), None, CACHED).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn unreachable_source_is_bad_gateway() {
    let resp = send(app(None), None, STALE).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
  }

  #[tokio::test]
  async fn unknown_route_is_not_found() {
    let resp = send(app(None), None, "/api/nowhere").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
