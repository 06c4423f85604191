//! Crawler for public channel preview pages (`https://t.me/s/<channel>`).
//!
//! [`TelegramCrawler`] implements [`chanlog_core::crawl::Crawler`]: it fetches
//! one page per call and hands the HTML to [`parse::parse_page`], a single
//! synchronous pass that either yields the whole batch or fails.

mod client;

pub mod error;
pub mod parse;

pub use client::{CrawlerConfig, TelegramCrawler};
pub use error::{Error, Result};

#[cfg(test)]
mod fixtures;
