//! Record types: the fixture as seen by one source, and the derived
//! competition aggregate.
//!
//! A fixture is an immutable observation. The engine never edits identity
//! fields; it only derives `search_index` and selects or discards whole
//! records.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ─── Source ──────────────────────────────────────────────────────────────────

/// The collaborator that produced a record. The wire value is what appears in
/// the published `source` field.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum Source {
  /// The dedicated results/fixtures registry.
  #[serde(rename = "gaa_gms")]
  #[strum(serialize = "gaa_gms")]
  Registry,
  /// The club-management platform.
  #[serde(rename = "clubzap")]
  #[strum(serialize = "clubzap")]
  Club,
  /// Calendar-feed imports.
  #[serde(rename = "ics")]
  #[strum(serialize = "ics")]
  Calendar,
  /// Ad-hoc web scraping.
  #[serde(rename = "scraper")]
  #[strum(serialize = "scraper")]
  Scraper,
}

impl Source {
  /// Every source, in the fixed order collaborator output is concatenated.
  pub const ALL: [Source; 4] =
    [Source::Registry, Source::Club, Source::Calendar, Source::Scraper];
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum Status {
  #[default]
  #[serde(rename = "scheduled")]
  #[strum(serialize = "scheduled")]
  Scheduled,
  /// Full time.
  #[serde(rename = "FT")]
  #[strum(serialize = "FT")]
  Finished,
  #[serde(rename = "PP")]
  #[strum(serialize = "PP")]
  Postponed,
}

// ─── Fixture ─────────────────────────────────────────────────────────────────

/// One real-world match occurrence as seen by one source.
///
/// `date` and `time` are Europe/London civil values. `time` of `00:00` is the
/// upstream convention for "no confirmed time"; the engine treats it literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
  /// Source-scoped identifier; not used for cross-source identity.
  pub id:           String,
  pub date:         NaiveDate,
  #[serde(with = "hhmm")]
  pub time:         NaiveTime,
  /// Competition name exactly as supplied by the source.
  pub competition:  String,
  pub home:         String,
  pub away:         String,
  #[serde(default)]
  pub venue:        Option<String>,
  #[serde(default)]
  pub status:       Status,
  #[serde(default, deserialize_with = "nullable_string")]
  pub score:        String,
  pub source:       Source,
  /// Assigned by the collaborator at fetch time.
  pub updated_at:   DateTime<Utc>,
  /// Derived comparison haystack; never supplied by a source.
  #[serde(default)]
  pub search_index: Option<String>,
}

impl Fixture {
  /// Kick-off as a naive London wall-clock value.
  pub fn kickoff(&self) -> NaiveDateTime { self.date.and_time(self.time) }

  pub fn is_finished(&self) -> bool { self.status == Status::Finished }

  pub fn has_score(&self) -> bool { !self.score.trim().is_empty() }

  pub fn has_venue(&self) -> bool {
    self.venue.as_deref().is_some_and(|v| !v.trim().is_empty())
  }

  /// Return a copy of this record carrying `index` as its search index.
  pub fn with_search_index(&self, index: String) -> Self {
    Self {
      search_index: Some(index),
      ..self.clone()
    }
  }
}

// ─── Competition ─────────────────────────────────────────────────────────────

/// A derived, read-only aggregate over fixtures sharing one literal
/// competition name. Recomputed every run; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Competition {
  pub name:          String,
  pub slug:          String,
  pub popularity:    u32,
  pub match_count:   usize,
  /// Earliest member kick-off as a UTC instant.
  pub first_kickoff: DateTime<Utc>,
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// `HH:MM` wall-clock encoding for [`NaiveTime`]. `HH:MM:SS` is also read,
/// truncated to the minute.
pub mod hhmm {
  use chrono::{NaiveTime, Timelike};
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub const FORMAT: &str = "%H:%M";

  pub fn serialize<S: Serializer>(
    time: &NaiveTime,
    serializer: S,
  ) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format(FORMAT))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    let time = NaiveTime::parse_from_str(raw, FORMAT)
      .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
      .map_err(de::Error::custom)?;
    Ok(time.with_second(0).unwrap_or(time).with_nanosecond(0).unwrap_or(time))
  }
}

/// Upstream caches sometimes carry `"score": null`.
fn nullable_string<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<String, D::Error> {
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
