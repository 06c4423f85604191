//! Error type for `chanlog-crawler`.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Transport failure or non-success status.
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("URL parse error: {0}")]
  Url(#[from] url::ParseError),

  #[error("Invalid selector '{selector}': {message}")]
  Selector { selector: String, message: String },

  /// A record on the page could not be decoded; the whole page is rejected.
  #[error("malformed {field} {value:?}: {message}")]
  Parse {
    field:   &'static str,
    value:   String,
    message: String,
  },
}

impl Error {
  pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
    Self::Selector {
      selector: selector.into(),
      message:  message.to_string(),
    }
  }

  pub fn parse(field: &'static str, value: impl Into<String>, message: impl fmt::Display) -> Self {
    Self::Parse {
      field,
      value: value.into(),
      message: message.to_string(),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
