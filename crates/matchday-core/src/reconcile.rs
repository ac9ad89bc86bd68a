//! Merge/dedupe: collapse many source-specific observations of the same match
//! into one canonical record.
//!
//! Two records describe the same match when they share a [`MatchKey`]. Within
//! a group the record with the highest `(source weight, completeness,
//! updated_at)` wins; on a full tie the earliest record in input order wins,
//! so results are reproducible for a fixed input ordering.

use std::{
  collections::{HashMap, hash_map::Entry},
  str::FromStr,
};

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};

use crate::{
  Error, Result,
  model::{Fixture, Source},
  normalize::{Normalizer, slugify},
};

// ─── Source priority ─────────────────────────────────────────────────────────

/// Total trust order over sources, highest trust first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePriority {
  order: Vec<Source>,
}

impl Default for SourcePriority {
  fn default() -> Self {
    Self {
      order: vec![Source::Registry, Source::Club, Source::Calendar, Source::Scraper],
    }
  }
}

impl SourcePriority {
  /// Build an ordering from sources listed highest trust first.
  pub fn new(order: Vec<Source>) -> Result<Self> {
    for (i, source) in order.iter().enumerate() {
      if order[..i].contains(source) {
        return Err(Error::DuplicateSource(*source));
      }
    }
    Ok(Self { order })
  }

  /// Build an ordering from wire names (`"gaa_gms"`, `"clubzap"`, ...).
  pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
    let order = names
      .iter()
      .map(|n| {
        Source::from_str(n.as_ref())
          .map_err(|_| Error::UnknownSource(n.as_ref().to_string()))
      })
      .collect::<Result<Vec<_>>>()?;
    Self::new(order)
  }

  /// Larger is more trusted. Sources absent from the ordering weigh 0,
  /// below every listed source.
  pub fn weight(&self, source: Source) -> usize {
    self
      .order
      .iter()
      .position(|s| *s == source)
      .map_or(0, |i| self.order.len() - i)
  }

  pub fn order(&self) -> &[Source] { &self.order }
}

// ─── Grouping key ────────────────────────────────────────────────────────────

/// Fuzzy identity of "the same match".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchKey {
  pub date:        NaiveDate,
  /// Minutes since midnight, rounded to the nearest 5.
  pub bucket:      u32,
  pub home:        String,
  pub away:        String,
  pub competition: String,
}

/// Round the time of day to the nearest 5-minute multiple, in minutes since
/// midnight. Half-way cases round to even, though whole minutes never land on
/// one (the remainder is an integer, never 2.5).
pub fn time_bucket(time: NaiveTime) -> u32 {
  let minutes = time.hour() * 60 + time.minute();
  let (quotient, remainder) = (minutes / 5, minutes % 5);
  let rounded = match remainder * 2 {
    r if r < 5 => quotient,
    r if r > 5 => quotient + 1,
    _ => quotient + (quotient % 2),
  };
  rounded * 5
}

/// Data-richness score: venue +1, full time +3, score +2.
pub fn completeness(fixture: &Fixture) -> u8 {
  let mut points = 0;
  if fixture.has_venue() {
    points += 1;
  }
  if fixture.is_finished() {
    points += 3;
  }
  if fixture.has_score() {
    points += 2;
  }
  points
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// Groups records by [`MatchKey`] and keeps one winner per group.
#[derive(Debug, Clone, Copy)]
pub struct Reconciler<'a> {
  normalizer: &'a Normalizer,
  priority:   &'a SourcePriority,
}

type Rank = (usize, u8, DateTime<Utc>);

impl<'a> Reconciler<'a> {
  pub fn new(normalizer: &'a Normalizer, priority: &'a SourcePriority) -> Self {
    Self {
      normalizer,
      priority,
    }
  }

  pub fn key(&self, fixture: &Fixture) -> MatchKey {
    MatchKey {
      date:        fixture.date,
      bucket:      time_bucket(fixture.time),
      home:        self.normalizer.team_key(&fixture.home),
      away:        self.normalizer.team_key(&fixture.away),
      competition: slugify(&fixture.competition),
    }
  }

  fn rank(&self, fixture: &Fixture) -> Rank {
    (
      self.priority.weight(fixture.source),
      completeness(fixture),
      fixture.updated_at,
    )
  }

  /// One winner per group, sorted ascending by `(date, time)`.
  ///
  /// Pure and total: an empty input yields an empty output.
  pub fn reconcile(&self, fixtures: Vec<Fixture>) -> Vec<Fixture> {
    let mut slots: HashMap<MatchKey, usize> = HashMap::new();
    let mut winners: Vec<(Rank, Fixture)> = Vec::new();

    for fixture in fixtures {
      let rank = self.rank(&fixture);
      match slots.entry(self.key(&fixture)) {
        Entry::Occupied(slot) => {
          // Strictly greater: on a full tie the earlier record stays.
          let winner = &mut winners[*slot.get()];
          if rank > winner.0 {
            *winner = (rank, fixture);
          }
        }
        Entry::Vacant(slot) => {
          slot.insert(winners.len());
          winners.push((rank, fixture));
        }
      }
    }

    let mut merged: Vec<Fixture> = winners.into_iter().map(|(_, f)| f).collect();
    merged.sort_by_key(|f| (f.date, f.time));
    merged
  }
}
