//! Calendar feeds (`.ics` subscriptions and club-site event exports) decoded
//! into fixtures.

use chrono::{DateTime, NaiveTime, Utc};
use matchday_core::{Fixture, Source, Status};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
  error::Result,
  ical::{self, Event},
  summary::{SummaryParser, is_adult_football},
};

/// Time given to finished events that carry no real kick-off.
fn result_time() -> NaiveTime { NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN) }

/// Where a calendar document came from and how to treat it.
#[derive(Debug, Clone, Copy)]
pub struct CalendarFeed<'a> {
  pub url:                 &'a str,
  /// `ics` for subscribed feeds, `scraper` for exports found on club sites.
  pub source:              Source,
  pub adult_football_only: bool,
}

impl CalendarFeed<'_> {
  fn default_competition(&self) -> &'static str {
    match self.source {
      Source::Scraper => "Football",
      _ => "Fixture",
    }
  }
}

/// Decode every usable event in `input`.
///
/// Dropped: events without both teams, scheduled events at `00:00`
/// (unconfirmed time), and non-adult-football events when the feed asks for
/// that filter. Finished events at `00:00` move to `12:00`.
pub fn decode(
  input: &str,
  feed: &CalendarFeed<'_>,
  fetched_at: DateTime<Utc>,
) -> Result<Vec<Fixture>> {
  let parser = SummaryParser::new()?;
  let events = ical::parse_events(input)?;
  let total = events.len();

  let fixtures: Vec<Fixture> = events
    .iter()
    .filter_map(|event| to_fixture(event, &parser, feed, fetched_at))
    .collect();

  debug!(
    url = feed.url,
    events = total,
    kept = fixtures.len(),
    "decoded calendar feed"
  );
  Ok(fixtures)
}

fn to_fixture(
  event: &Event,
  parser: &SummaryParser,
  feed: &CalendarFeed<'_>,
  fetched_at: DateTime<Utc>,
) -> Option<Fixture> {
  let (date, mut time) = event.start.london();
  let parts = parser.parse(&event.summary);

  let competition = event
    .categories
    .first()
    .cloned()
    .or(parts.competition)
    .unwrap_or_else(|| feed.default_competition().to_string());

  if feed.adult_football_only
    && !is_adult_football(&format!("{competition} {}", event.summary))
  {
    return None;
  }

  let status = if parts.score.is_empty() {
    if time == NaiveTime::MIN {
      return None;
    }
    Status::Scheduled
  } else {
    if time == NaiveTime::MIN {
      time = result_time();
    }
    Status::Finished
  };

  if parts.home.is_empty() || parts.away.is_empty() {
    return None;
  }

  Some(Fixture {
    id: event_id(event, feed.url),
    date,
    time,
    competition,
    home: parts.home,
    away: parts.away,
    venue: event.location.clone(),
    status,
    score: parts.score,
    source: feed.source,
    updated_at: fetched_at,
    search_index: None,
  })
}

/// `ics-<UID>`, or a digest of feed URL, start and title when the event has
/// no UID.
fn event_id(event: &Event, url: &str) -> String {
  if let Some(uid) = &event.uid {
    return format!("ics-{uid}");
  }
  let mut hasher = Sha256::new();
  hasher.update(url.as_bytes());
  hasher.update(b"\n");
  hasher.update(format!("{:?}", event.start).as_bytes());
  hasher.update(b"\n");
  hasher.update(event.summary.as_bytes());
  let digest = hex::encode(hasher.finalize());
  format!("ics-{}", &digest[..20])
}
