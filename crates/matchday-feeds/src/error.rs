//! Error types for the matchday-feeds decoders.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("calendar missing BEGIN/END:VCALENDAR envelope")]
  MissingEnvelope,

  #[error("malformed content-line: {0}")]
  MalformedContentLine(String),

  #[error("invalid date-time in {property}: {value}")]
  InvalidDateTime { property: String, value: String },

  #[error("payload holds no fixture list")]
  NotAList,

  #[error("invalid summary pattern: {0}")]
  Pattern(#[from] regex::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
