//! Whole-file replacement: write a sibling temp file, flush it to disk, then
//! rename it over the target. Readers see the old file or the new one, never
//! a partial write.

use std::{fs, io::Write as _, path::Path};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// A uniquely named temp file beside `path`, removed again if it is never
/// persisted.
fn sibling_temp(path: &Path) -> Result<NamedTempFile> {
  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };
  let mut prefix = std::ffi::OsString::from(".");
  prefix.push(path.file_name().unwrap_or_default());
  prefix.push(".");
  tempfile::Builder::new()
    .prefix(&prefix)
    .suffix(".tmp")
    .tempfile_in(dir)
    .map_err(Error::io(dir))
}

/// Atomically replace `path` with `bytes`, creating parent directories.
pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(Error::io(parent))?;
  }

  let mut temp = sibling_temp(path)?;
  temp.write_all(bytes).map_err(Error::io(temp.path()))?;
  temp.as_file().sync_all().map_err(Error::io(temp.path()))?;
  temp.persist(path).map_err(|e| Error::io(path)(e.error))?;
  Ok(())
}

/// Atomically replace `path` with pretty-printed JSON. Object keys come out
/// sorted.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
  // `Value` maps are ordered, so a round-trip through it sorts every key.
  let value = serde_json::to_value(value).map_err(Error::json(path))?;
  let mut text = serde_json::to_string_pretty(&value).map_err(Error::json(path))?;
  text.push('\n');
  write_bytes(path, text.as_bytes())
}
