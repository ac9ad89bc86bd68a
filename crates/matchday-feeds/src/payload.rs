//! JSON envelope handling shared by the registry and club decoders.

use chrono::{DateTime, SecondsFormat, Utc};
use matchday_core::{Fixture, Source};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Strip a JSONP `callback( ... );` wrapper, if any.
pub fn strip_jsonp(body: &str) -> &str {
  let trimmed = body.trim();
  if trimmed.starts_with(['[', '{']) {
    return trimmed;
  }
  match (trimmed.find('('), trimmed.rfind(')')) {
    (Some(open), Some(close)) if close > open => &trimmed[open + 1..close],
    _ => trimmed,
  }
}

/// The item list of a payload: either a bare array, or the first array found
/// under one of `keys`.
pub fn items(body: &str, keys: &[&str]) -> Result<Vec<Value>> {
  match serde_json::from_str(strip_jsonp(body))? {
    Value::Array(items) => Ok(items),
    Value::Object(mut map) => keys
      .iter()
      .find_map(|k| match map.remove(*k) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
      })
      .ok_or(Error::NotAList),
    _ => Err(Error::NotAList),
  }
}

/// Decode a list of records that are already in fixture shape. `source` is
/// forced, any `search_index` is discarded and a missing `updated_at` is
/// filled with `fetched_at`. Items that do not deserialise are dropped.
pub fn fixture_records(
  body: &str,
  source: Source,
  fetched_at: DateTime<Utc>,
) -> Result<Vec<Fixture>> {
  let stamp = fetched_at.to_rfc3339_opts(SecondsFormat::Secs, true);
  let mut fixtures = Vec::new();

  for item in items(body, &["fixtures"])? {
    let Value::Object(mut map) = item else {
      debug!(%source, "skipping non-object item");
      continue;
    };
    map.insert("source".into(), Value::String(source.to_string()));
    map.remove("search_index");
    map
      .entry("updated_at")
      .or_insert_with(|| Value::String(stamp.clone()));

    match serde_json::from_value::<Fixture>(Value::Object(map)) {
      Ok(fixture) => fixtures.push(fixture),
      Err(e) => debug!(%source, error = %e, "skipping invalid item"),
    }
  }

  Ok(fixtures)
}
