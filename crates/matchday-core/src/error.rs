//! Error types for `matchday-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid data tables: {0}")]
  InvalidTables(#[from] toml::de::Error),

  #[error("unknown source: {0:?}")]
  UnknownSource(String),

  #[error("source {0} listed more than once in priority order")]
  DuplicateSource(crate::model::Source),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
