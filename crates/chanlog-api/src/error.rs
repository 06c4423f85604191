//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  /// The external source could not be crawled.
  #[error("upstream error: {0}")]
  Upstream(#[source] chanlog_core::Error),

  #[error("store error: {0}")]
  Store(#[source] chanlog_core::Error),
}

impl From<chanlog_core::Error> for ApiError {
  fn from(e: chanlog_core::Error) -> Self {
    use chanlog_core::Error as E;
    match e {
      E::InvalidRange { .. } => ApiError::BadRequest(e.to_string()),
      E::NoMessagesInRange(_) => ApiError::NotFound(e.to_string()),
      E::Store(_) => ApiError::Store(e),
      E::Crawl { .. } | E::BackfillLimit { .. } | E::CursorNotAdvanced { .. } => {
        ApiError::Upstream(e)
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
      ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
