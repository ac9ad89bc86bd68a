//! Publication windows: which canonical fixtures go into the upcoming feed and
//! which into the recent-results feed.

use chrono::{DateTime, Days, NaiveDate, Utc};
use chrono_tz::Europe::London;

use crate::model::{Fixture, Source};

/// Maximum number of results served by the fallback feed.
pub const FALLBACK_LIMIT: usize = 50;

/// Window horizons, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowConfig {
  pub days_forward:          u32,
  pub results_days_back:     u32,
  /// Forward horizon for scraped fixtures; usually wider than `days_forward`.
  pub scraper_days_forward:  u32,
  pub results_fallback_days: u32,
}

impl Default for WindowConfig {
  fn default() -> Self {
    Self {
      days_forward:          14,
      results_days_back:     7,
      scraper_days_forward:  14,
      results_fallback_days: 365,
    }
  }
}

/// The selected windows.
#[derive(Debug, Clone, Default)]
pub struct Windows {
  pub upcoming:      Vec<Fixture>,
  pub recent:        Vec<Fixture>,
  /// Set when `recent` came from the long-range fallback.
  pub used_fallback: bool,
}

/// The Europe/London civil date of `now`.
pub fn london_today(now: DateTime<Utc>) -> NaiveDate {
  now.with_timezone(&London).date_naive()
}

fn plus(date: NaiveDate, days: u32) -> NaiveDate {
  date
    .checked_add_days(Days::new(u64::from(days)))
    .unwrap_or(NaiveDate::MAX)
}

fn minus(date: NaiveDate, days: u32) -> NaiveDate {
  date
    .checked_sub_days(Days::new(u64::from(days)))
    .unwrap_or(NaiveDate::MIN)
}

/// Slice `fixtures` (already canonical, placeholder-free and collapsed) into
/// the upcoming and recent windows relative to `today`.
pub fn select(fixtures: &[Fixture], today: NaiveDate, config: &WindowConfig) -> Windows {
  let fixtures_end = plus(today, config.days_forward);
  let scraper_end = plus(today, config.scraper_days_forward);
  let results_start = minus(today, config.results_days_back);

  let upcoming: Vec<Fixture> = fixtures
    .iter()
    .filter(|f| {
      f.date >= today
        && (f.date <= fixtures_end
          || (f.source == Source::Scraper && f.date <= scraper_end))
    })
    .cloned()
    .collect();

  let recent: Vec<Fixture> = fixtures
    .iter()
    .filter(|f| {
      results_start <= f.date
        && f.date <= today
        && (f.is_finished() || f.has_score())
    })
    .cloned()
    .collect();

  if !recent.is_empty() {
    return Windows {
      upcoming,
      recent,
      used_fallback: false,
    };
  }

  let cutoff = minus(today, config.results_fallback_days);
  let mut fallback: Vec<Fixture> = fixtures
    .iter()
    .filter(|f| f.is_finished() && f.date >= cutoff)
    .cloned()
    .collect();
  fallback.sort_by(|a, b| b.kickoff().cmp(&a.kickoff()));
  fallback.truncate(FALLBACK_LIMIT);

  Windows {
    upcoming,
    recent: fallback,
    used_fallback: true,
  }
}
