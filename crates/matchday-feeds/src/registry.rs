//! Decoders for the fixtures registry: the open-data feed and the older JSONP
//! fixtures endpoint.
//!
//! Field names in the open-data feed vary between registry deployments, so
//! every value is looked up under a list of candidate keys. Items missing a
//! required value are dropped.

use chrono::{
  DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::Europe::London;
use matchday_core::{Fixture, Source, Status};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{error::Result, payload};

/// Keys that may hold the item list in an object envelope.
pub const LIST_KEYS: &[&str] = &["fixtures", "items", "data", "results"];

const ID_KEYS: &[&str] = &["id", "fixtureId", "matchId", "uuid"];
const COMPETITION_KEYS: &[&str] = &["competition", "competitionName", "competitionTitle"];
const HOME_KEYS: &[&str] = &["homeTeam", "homeTeamName", "home"];
const AWAY_KEYS: &[&str] = &["awayTeam", "awayTeamName", "away"];
const VENUE_KEYS: &[&str] = &["venue", "venueName"];
const STATUS_KEYS: &[&str] = &["status", "state"];
const INSTANT_KEYS: &[&str] = &["startDateTime", "throwIn", "kickOff", "start", "dateTime"];

/// Decode the legacy JSONP endpoint, which serves records in fixture shape.
/// Every record is tagged as the registry.
pub fn decode_legacy(body: &str, fetched_at: DateTime<Utc>) -> Result<Vec<Fixture>> {
  payload::fixture_records(body, Source::Registry, fetched_at)
}

/// Raw rows of one registry page.
pub fn rows(body: &str) -> Result<Vec<Value>> { payload::items(body, LIST_KEYS) }

/// Decode a whole registry payload, dropping unusable items.
pub fn decode(body: &str, fetched_at: DateTime<Utc>) -> Result<Vec<Fixture>> {
  let rows = rows(body)?;
  let total = rows.len();
  let fixtures: Vec<Fixture> = rows.iter().filter_map(|row| map_item(row, fetched_at)).collect();
  if fixtures.len() < total {
    debug!(dropped = total - fixtures.len(), "registry items without required fields");
  }
  Ok(fixtures)
}

/// Map one open-data item to a fixture.
pub fn map_item(item: &Value, fetched_at: DateTime<Utc>) -> Option<Fixture> {
  let item = item.as_object()?;

  let id = text(item, ID_KEYS)?;
  let competition = text(item, COMPETITION_KEYS)?;
  let home = text(item, HOME_KEYS)?;
  let away = text(item, AWAY_KEYS)?;
  let (date, time) = kickoff(item)?;

  Some(Fixture {
    id,
    date,
    time,
    competition,
    home,
    away,
    venue: text(item, VENUE_KEYS),
    status: status(item),
    score: score(item),
    source: Source::Registry,
    updated_at: fetched_at,
    search_index: None,
  })
}

/// First non-null, non-empty value under `keys`, rendered as text.
fn text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|k| match item.get(*k)? {
    Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  })
}

fn status(item: &Map<String, Value>) -> Status {
  let raw = text(item, STATUS_KEYS)
    .unwrap_or_default()
    .to_lowercase();
  if raw.contains("postpon") {
    Status::Postponed
  } else if raw.contains("ft") || raw.contains("result") || raw == "finished" {
    Status::Finished
  } else {
    Status::Scheduled
  }
}

/// `"G-P – G-P"` from goals/points, else `"H – A"` from totals, else empty.
fn score(item: &Map<String, Value>) -> String {
  let get = |a: &str, b: &str| text(item, &[a, b]);
  if let (Some(hg), Some(hp), Some(ag), Some(ap)) = (
    get("homeGoals", "home_goals"),
    get("homePoints", "home_points"),
    get("awayGoals", "away_goals"),
    get("awayPoints", "away_points"),
  ) {
    return format!("{hg}-{hp} – {ag}-{ap}");
  }
  match (get("homeScore", "home_score"), get("awayScore", "away_score")) {
    (Some(h), Some(a)) => format!("{h} – {a}"),
    _ => String::new(),
  }
}

/// London civil date and time of kick-off.
///
/// An instant key wins; offset-less values are read as London wall time.
/// Otherwise `date` and `time` must both be present.
fn kickoff(item: &Map<String, Value>) -> Option<(NaiveDate, NaiveTime)> {
  if let Some(raw) = text(item, INSTANT_KEYS) {
    return parse_instant(&raw);
  }
  let date = NaiveDate::parse_from_str(&text(item, &["date"])?, "%Y-%m-%d").ok()?;
  let time = parse_time(&text(item, &["time"])?)?;
  Some((date, time))
}

fn parse_instant(raw: &str) -> Option<(NaiveDate, NaiveTime)> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    let local = London.from_utc_datetime(&dt.naive_utc()).naive_local();
    return Some(split(local));
  }
  ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(split)
    .or_else(|| {
      NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| (d, NaiveTime::MIN))
    })
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
  NaiveTime::parse_from_str(raw, "%H:%M")
    .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    .ok()
    .map(|t| NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t))
}

fn split(local: NaiveDateTime) -> (NaiveDate, NaiveTime) {
  let t = local.time();
  (
    local.date(),
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t),
  )
}
