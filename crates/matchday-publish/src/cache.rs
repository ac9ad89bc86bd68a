//! Raw fetch cache: what each source returned on the last fetch, the error
//! text of any source that failed, and the combined list `build` reads.

use std::{
  fs, io,
  path::{Path, PathBuf},
};

use matchday_core::{Fixture, Source};
use tracing::{debug, warn};

use crate::{Error, Result, atomic};

pub const COMBINED_FILE: &str = "combined_raw.json";

#[derive(Debug, Clone)]
pub struct RawCache {
  dir: PathBuf,
}

impl RawCache {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }

  /// `<source>_raw.json`
  pub fn raw_path(&self, source: Source) -> PathBuf {
    self.dir.join(format!("{source}_raw.json"))
  }

  /// `<source>_error.log`
  pub fn error_path(&self, source: Source) -> PathBuf {
    self.dir.join(format!("{source}_error.log"))
  }

  pub fn combined_path(&self) -> PathBuf { self.dir.join(COMBINED_FILE) }

  /// Record one source's output and clear any stale error log for it.
  pub fn write_raw(&self, source: Source, fixtures: &[Fixture]) -> Result<()> {
    atomic::write_json(&self.raw_path(source), fixtures)?;
    let stale = self.error_path(source);
    match fs::remove_file(&stale) {
      Ok(()) => debug!(%source, "cleared previous error log"),
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(Error::io(stale)(e)),
    }
    Ok(())
  }

  /// Record why `source` failed.
  pub fn write_error(&self, source: Source, message: &str) -> Result<()> {
    warn!(%source, path = %self.error_path(source).display(), "source failed");
    atomic::write_bytes(&self.error_path(source), message.as_bytes())
  }

  pub fn write_combined(&self, fixtures: &[Fixture]) -> Result<()> {
    atomic::write_json(&self.combined_path(), fixtures)
  }

  /// The combined list from the last fetch, or `None` if there is none.
  pub fn read_combined(&self) -> Result<Option<Vec<Fixture>>> {
    let path = self.combined_path();
    let text = match fs::read_to_string(&path) {
      Ok(text) => text,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(Error::io(path)(e)),
    };
    let fixtures = serde_json::from_str(&text).map_err(Error::json(&path))?;
    Ok(Some(fixtures))
  }
}
