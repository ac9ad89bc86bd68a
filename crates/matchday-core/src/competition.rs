//! Competition aggregation and popularity ranking.
//!
//! Fixtures are grouped by their literal competition string (not its slug),
//! so two spellings of one competition show up as two entries even though
//! the reconciler treats them as one match.

use std::cmp::Reverse;

use chrono::{
  DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Europe::London;

use crate::{
  model::{Competition, Fixture},
  normalize::slugify,
  tables::PopularityRule,
};

/// Number of entries in the weekend view.
pub const WEEKEND_TOP: usize = 3;

/// Interpret a London wall-clock value as a UTC instant.
///
/// Ambiguous autumn times resolve to the earlier instant. Times skipped by the
/// spring transition use the pre-transition offset.
pub fn london_to_utc(local: NaiveDateTime) -> DateTime<Utc> {
  if let Some(instant) = London.from_local_datetime(&local).earliest() {
    return instant.with_timezone(&Utc);
  }
  let hour = TimeDelta::hours(1);
  match London.from_local_datetime(&(local - hour)).earliest() {
    Some(before) => before.with_timezone(&Utc) + hour,
    None => local.and_utc(),
  }
}

/// The Saturday on or after `today`, and the Sunday after it.
pub fn weekend_for(today: NaiveDate) -> (NaiveDate, NaiveDate) {
  let days_to_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
  let saturday = today + Days::new(u64::from(days_to_saturday));
  (saturday, saturday + Days::new(1))
}

/// Additive keyword scoring over competition names.
#[derive(Debug, Clone)]
pub struct Popularity {
  rules: Vec<PopularityRule>,
}

impl Popularity {
  pub fn new(rules: Vec<PopularityRule>) -> Self { Self { rules } }

  /// Sum of every rule that matches the lowercase name, each counted once.
  pub fn score(&self, name: &str) -> u32 {
    let lower = name.to_lowercase();
    self
      .rules
      .iter()
      .filter(|rule| rule.matches(&lower))
      .map(|rule| rule.score)
      .sum()
  }

  /// Group `fixtures` by literal competition name and rank the groups by
  /// popularity desc, match count desc, first kick-off asc.
  pub fn aggregate(&self, fixtures: &[Fixture]) -> Vec<Competition> {
    let mut groups: Vec<(&str, Vec<&Fixture>)> = Vec::new();
    for f in fixtures {
      match groups.iter_mut().find(|(name, _)| *name == f.competition) {
        Some((_, members)) => members.push(f),
        None => groups.push((&f.competition, vec![f])),
      }
    }

    let mut out: Vec<Competition> = groups
      .into_iter()
      .filter_map(|(name, members)| {
        let first = members.iter().min_by_key(|f| (f.date, f.time))?;
        Some(Competition {
          name:          name.to_string(),
          slug:          slugify(name),
          popularity:    self.score(name),
          match_count:   members.len(),
          first_kickoff: london_to_utc(first.kickoff()),
        })
      })
      .collect();
    out.sort_by_key(|c| (Reverse(c.popularity), Reverse(c.match_count), c.first_kickoff));
    out
  }

  /// Top competitions among fixtures on the weekend of `today`.
  pub fn weekend_top(&self, fixtures: &[Fixture], today: NaiveDate) -> Vec<Competition> {
    let (saturday, sunday) = weekend_for(today);
    let weekend: Vec<Fixture> = fixtures
      .iter()
      .filter(|f| saturday <= f.date && f.date <= sunday)
      .cloned()
      .collect();
    let mut ranked = self.aggregate(&weekend);
    ranked.truncate(WEEKEND_TOP);
    ranked
  }
}
