//! Core types and trait definitions for the chanlog channel-history cache.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the domain model, the [`store::HistoryStore`] and [`crawl::Crawler`]
//! abstractions, and the [`sync::SyncEngine`] that ties them together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod crawl;
pub mod error;
pub mod history;
pub mod memory;
pub mod query;
pub mod store;
pub mod sync;

pub use error::{Error, Result};
