//! Collapse accidental re-publication of the same future pairing.
//!
//! Sources sometimes post one pairing twice (a typo'd competition string, a
//! re-posted date). Non-final fixtures are grouped by normalised
//! `(home, away)` regardless of date, time and competition, and only the
//! earliest survives. Finished fixtures are never collapsed: a pairing can
//! legitimately meet several times in a season.

use std::collections::{HashMap, hash_map::Entry};

use crate::{model::Fixture, normalize::Normalizer};

/// Keep the earliest non-final fixture per team pair; keep every `FT`
/// fixture. Output is sorted ascending by `(date, time)`.
pub fn collapse_future_duplicates(
  fixtures: Vec<Fixture>,
  normalizer: &Normalizer,
) -> Vec<Fixture> {
  let mut earliest: HashMap<(String, String), usize> = HashMap::new();

  for (i, f) in fixtures.iter().enumerate() {
    if f.is_finished() {
      continue;
    }
    let pair = (normalizer.team_key(&f.home), normalizer.team_key(&f.away));
    match earliest.entry(pair) {
      Entry::Occupied(mut slot) => {
        // Strictly earlier: equal kick-offs keep the first seen.
        if f.kickoff() < fixtures[*slot.get()].kickoff() {
          slot.insert(i);
        }
      }
      Entry::Vacant(slot) => {
        slot.insert(i);
      }
    }
  }

  let mut keep = vec![false; fixtures.len()];
  for i in earliest.into_values() {
    keep[i] = true;
  }

  let mut out: Vec<Fixture> = fixtures
    .into_iter()
    .zip(keep)
    .filter_map(|(f, kept)| (kept || f.is_finished()).then_some(f))
    .collect();
  out.sort_by_key(|f| (f.date, f.time));
  out
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

  use super::*;
  use crate::{
    model::{Source, Status},
    tables::Tables,
  };

  fn fixture(id: &str, date: (i32, u32, u32), comp: &str, status: Status) -> Fixture {
    Fixture {
      id:           id.into(),
      date:         NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
      time:         NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
      competition:  comp.into(),
      home:         "Dublin".into(),
      away:         "Kerry".into(),
      venue:        None,
      status,
      score:        String::new(),
      source:       Source::Scraper,
      updated_at:   Utc.with_ymd_and_hms(2025, 10, 30, 0, 0, 0).unwrap(),
      search_index: None,
    }
  }

  fn normalizer() -> Normalizer { Normalizer::new(&Tables::builtin().unwrap()) }

  #[test]
  fn keeps_earliest_scheduled_pairing() {
    let out = collapse_future_duplicates(
      vec![
        fixture("late", (2025, 11, 15), "Division 2 League", Status::Scheduled),
        fixture("early", (2025, 11, 1), "Div 2 Leauge", Status::Scheduled),
      ],
      &normalizer(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "early");
  }

  #[test]
  fn finished_fixtures_always_survive() {
    let out = collapse_future_duplicates(
      vec![
        fixture("early", (2025, 11, 1), "Division 2 League", Status::Scheduled),
        fixture("result", (2025, 11, 15), "Div 2 Leauge", Status::Finished),
      ],
      &normalizer(),
    );
    let ids: Vec<_> = out.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["early", "result"]);
  }

  #[test]
  fn postponed_fixtures_collapse_too() {
    let out = collapse_future_duplicates(
      vec![
        fixture("pp", (2025, 11, 1), "League", Status::Postponed),
        fixture("rescheduled", (2025, 11, 8), "League", Status::Scheduled),
      ],
      &normalizer(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "pp");
  }

  #[test]
  fn reversed_pairing_is_a_different_group() {
    let mut away_leg = fixture("away-leg", (2025, 11, 8), "League", Status::Scheduled);
    std::mem::swap(&mut away_leg.home, &mut away_leg.away);
    let out = collapse_future_duplicates(
      vec![fixture("home-leg", (2025, 11, 1), "League", Status::Scheduled), away_leg],
      &normalizer(),
    );
    assert_eq!(out.len(), 2);
  }

  #[test]
  fn equal_kickoffs_keep_first_seen() {
    let out = collapse_future_duplicates(
      vec![
        fixture("first", (2025, 11, 1), "League", Status::Scheduled),
        fixture("second", (2025, 11, 1), "Cup", Status::Scheduled),
      ],
      &normalizer(),
    );
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "first");
  }

  #[test]
  fn empty_input() {
    assert!(collapse_future_duplicates(vec![], &normalizer()).is_empty());
  }
}
