//! [`TelegramCrawler`] — HTTP side of the crawler.

use std::time::Duration;

use chanlog_core::crawl::{CrawlOutcome, Crawler, Cursor};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{Result, parse::parse_page};

/// Settings for the preview-page client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
  /// Origin serving the `/s/<channel>` preview pages.
  pub base_url:     String,
  pub user_agent:   String,
  pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
  fn default() -> Self {
    Self {
      base_url:     "https://t.me/".to_string(),
      user_agent:   concat!("chanlog/", env!("CARGO_PKG_VERSION")).to_string(),
      timeout_secs: 20,
    }
  }
}

/// Fetches one preview page per call.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct TelegramCrawler {
  client:   Client,
  base_url: Url,
}

impl TelegramCrawler {
  pub fn new(config: &CrawlerConfig) -> Result<Self> {
    let client = Client::builder()
      .user_agent(&config.user_agent)
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;

    // `Url::join` replaces the last path segment unless the base ends in '/'.
    let mut base = config.base_url.clone();
    if !base.ends_with('/') {
      base.push('/');
    }

    Ok(Self { client, base_url: Url::parse(&base)? })
  }

  /// `<base>/s/<channel>[?after=<id>|?before=<id>]`
  pub fn page_url(&self, channel_id: &str, cursor: Cursor) -> Result<Url> {
    let mut url = self.base_url.join(&format!("s/{channel_id}"))?;
    match cursor {
      Cursor::Latest => {}
      Cursor::After(id) => {
        url.query_pairs_mut().append_pair("after", &id.to_string());
      }
      Cursor::Before(id) => {
        url.query_pairs_mut().append_pair("before", &id.to_string());
      }
    }
    Ok(url)
  }
}

impl Crawler for TelegramCrawler {
  type Error = crate::Error;

  async fn fetch(&self, channel_id: &str, cursor: Cursor) -> Result<CrawlOutcome> {
    let url = self.page_url(channel_id, cursor)?;
    tracing::debug!(%url, "fetching channel page");

    let html = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .text()
      .await?;

    let outcome = parse_page(&html, cursor)?;
    match &outcome {
      CrawlOutcome::Page(page) => {
        tracing::debug!(channel = channel_id, %cursor, records = page.records.len(), "got page");
      }
      CrawlOutcome::NoNewData => {
        tracing::debug!(channel = channel_id, %cursor, "no messages found");
      }
    }
    Ok(outcome)
  }
}
