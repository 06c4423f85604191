//! JSON REST API for chanlog.
//!
//! Exposes an axum [`Router`] backed by a [`SyncEngine`] over any
//! [`HistoryStore`] and [`Crawler`]. Auth, TLS, and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", chanlog_api::api_router(engine.clone()))
//! ```

pub mod error;
pub mod messages;

use std::sync::Arc;

use axum::{Router, routing::get};
use chanlog_core::{crawl::Crawler, store::HistoryStore, sync::SyncEngine};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(engine: Arc<SyncEngine<S, C>>) -> Router<()>
where
  S: HistoryStore + 'static,
  C: Crawler + 'static,
{
  Router::new()
    .route("/channels/{channel_id}/messages", get(messages::list::<S, C>))
    .with_state(engine)
}

// ─── Integration tests ────────────────────────────────────────────────────────
