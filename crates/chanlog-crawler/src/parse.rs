//! Extraction of records and channel metadata from a preview page.
//!
//! The page is parsed once and walked once. Any malformed record aborts the
//! whole page so that callers never merge a partial batch.

use std::sync::LazyLock;

use chanlog_core::{
  crawl::{CrawlOutcome, Cursor, Page},
  history::{ChannelMetadata, Record, RecordId},
};
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::{Error, Result};

const MESSAGE_SELECTOR: &str = ".tgme_widget_message_wrap";
const MESSAGE_INFO_SELECTOR: &str = ".tgme_widget_message";
const MESSAGE_DATE_SELECTOR: &str = ".tgme_widget_message_date > time";
const MESSAGE_CONTENT_SELECTOR: &str = ".tgme_widget_message_text";
const MESSAGE_IMAGE_SELECTOR: &str = ".tgme_widget_message_user_photo > img";

const CHANNEL_NAME_SELECTOR: &str = ".tgme_channel_info_header_title";
const CHANNEL_IMAGE_SELECTOR: &str = ".tgme_channel_info_header img";
const NO_MESSAGES_SELECTOR: &str = ".tme_no_messages_found";

struct Selectors {
  message:       Selector,
  message_info:  Selector,
  message_date:  Selector,
  content:       Selector,
  message_image: Selector,
  channel_name:  Selector,
  channel_image: Selector,
  no_messages:   Selector,
}

/// A selector that failed to parse, with scraper's message.
type SelectorResult<T> = std::result::Result<T, (&'static str, String)>;

/// Compiled once per process; every selector is a constant.
static SELECTORS: LazyLock<SelectorResult<Selectors>> = LazyLock::new(Selectors::new);

impl Selectors {
  fn new() -> SelectorResult<Self> {
    Ok(Self {
      message:       parse_selector(MESSAGE_SELECTOR)?,
      message_info:  parse_selector(MESSAGE_INFO_SELECTOR)?,
      message_date:  parse_selector(MESSAGE_DATE_SELECTOR)?,
      content:       parse_selector(MESSAGE_CONTENT_SELECTOR)?,
      message_image: parse_selector(MESSAGE_IMAGE_SELECTOR)?,
      channel_name:  parse_selector(CHANNEL_NAME_SELECTOR)?,
      channel_image: parse_selector(CHANNEL_IMAGE_SELECTOR)?,
      no_messages:   parse_selector(NO_MESSAGES_SELECTOR)?,
    })
  }
}

fn parse_selector(s: &'static str) -> SelectorResult<Selector> {
  Selector::parse(s).map_err(|e| (s, format!("{e:?}")))
}

fn selectors() -> Result<&'static Selectors> {
  SELECTORS
    .as_ref()
    .map_err(|(selector, message)| Error::selector(*selector, message))
}

/// Turn one fetched page into a crawl outcome.
///
/// Records are returned in id order and only if they lie strictly beyond
/// `cursor`; a page with nothing left, or carrying the "no messages found"
/// marker, is [`CrawlOutcome::NoNewData`].
pub fn parse_page(html: &str, cursor: Cursor) -> Result<CrawlOutcome> {
  let sel = selectors()?;
  let document = Html::parse_document(html);

  if document.select(&sel.no_messages).next().is_some() {
    return Ok(CrawlOutcome::NoNewData);
  }

  let metadata = ChannelMetadata {
    name:      document
      .select(&sel.channel_name)
      .next()
      .map(element_text)
      .unwrap_or_default(),
    image_url: document
      .select(&sel.channel_image)
      .next()
      .and_then(|img| img.value().attr("src"))
      .unwrap_or_default()
      .to_owned(),
  };

  let mut records = document
    .select(&sel.message)
    .map(|wrapper| parse_record(wrapper, &sel))
    .collect::<Result<Vec<_>>>()?;

  records.sort_by_key(|r| r.id);
  records.retain(|r| is_beyond(cursor, r.id));

  if records.is_empty() {
    return Ok(CrawlOutcome::NoNewData);
  }

  Ok(CrawlOutcome::Page(Page { metadata, records }))
}

fn is_beyond(cursor: Cursor, id: RecordId) -> bool {
  match cursor {
    Cursor::Latest => true,
    Cursor::After(after) => id > after,
    Cursor::Before(before) => id < before,
  }
}

fn parse_record(wrapper: ElementRef<'_>, sel: &Selectors) -> Result<Record> {
  let date = parse_date(wrapper, sel)?;
  let id = parse_id(wrapper, sel)?;

  let content = wrapper
    .select(&sel.content)
    .next()
    .map(element_text)
    .unwrap_or_default();

  let image = wrapper
    .select(&sel.message_image)
    .next()
    .and_then(|img| img.value().attr("src"))
    .filter(|src| !src.is_empty())
    .map(str::to_owned);

  Ok(Record { id, date, content, image })
}

fn parse_date(wrapper: ElementRef<'_>, sel: &Selectors) -> Result<DateTime<Utc>> {
  let raw = wrapper
    .select(&sel.message_date)
    .next()
    .and_then(|time| time.value().attr("datetime"))
    .unwrap_or_default();

  DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::parse("date", raw, e))
}

/// `data-post` has the form `<channel>/<id>`.
fn parse_id(wrapper: ElementRef<'_>, sel: &Selectors) -> Result<RecordId> {
  let raw = wrapper
    .select(&sel.message_info)
    .next()
    .and_then(|info| info.value().attr("data-post"))
    .unwrap_or_default();

  let (_, id) = raw
    .split_once('/')
    .ok_or_else(|| Error::parse("id", raw, "expected <channel>/<id>"))?;

  id.parse().map_err(|e| Error::parse("id", raw, e))
}

fn element_text(el: ElementRef<'_>) -> String {
  el.text().collect::<String>().trim().to_owned()
}
