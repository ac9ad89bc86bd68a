//! The batch pipeline: index, reconcile, drop placeholders, collapse, window.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
  collapse::collapse_future_duplicates,
  competition::Popularity,
  model::{Competition, Fixture},
  normalize::Normalizer,
  placeholder::PlaceholderClassifier,
  reconcile::{Reconciler, SourcePriority},
  tables::Tables,
  window::{self, WindowConfig, london_today},
};

/// The three artifacts of a run.
#[derive(Debug, Clone, Default)]
pub struct Publication {
  pub upcoming:          Vec<Fixture>,
  pub recent:            Vec<Fixture>,
  pub competitions:      Vec<Competition>,
  /// `recent` was filled from the long-range fallback.
  pub results_fell_back: bool,
}

/// Reconciliation engine configured with one set of static tables and one
/// source trust ordering.
#[derive(Debug, Clone)]
pub struct Engine {
  normalizer:   Normalizer,
  placeholders: PlaceholderClassifier,
  priority:     SourcePriority,
  popularity:   Popularity,
}

impl Engine {
  pub fn new(tables: &Tables, priority: SourcePriority) -> Self {
    Self {
      normalizer: Normalizer::new(tables),
      placeholders: PlaceholderClassifier::new(tables.placeholder.clone()),
      priority,
      popularity: Popularity::new(tables.popularity.clone()),
    }
  }

  pub fn placeholders(&self) -> &PlaceholderClassifier { &self.placeholders }

  pub fn popularity(&self) -> &Popularity { &self.popularity }

  /// True if either team is a tournament slot rather than a real team.
  pub fn has_placeholder_team(&self, fixture: &Fixture) -> bool {
    self.placeholders.is_placeholder(&fixture.home)
      || self.placeholders.is_placeholder(&fixture.away)
  }

  /// Merge/dedupe only, over indexed copies of `fixtures`.
  pub fn reconcile(&self, fixtures: &[Fixture]) -> Vec<Fixture> {
    let indexed: Vec<Fixture> =
      fixtures.iter().map(|f| self.normalizer.index(f)).collect();
    Reconciler::new(&self.normalizer, &self.priority).reconcile(indexed)
  }

  /// The canonical fixture set: reconciled, placeholder-free and collapsed,
  /// sorted by `(date, time)`.
  pub fn canonical(&self, fixtures: &[Fixture]) -> Vec<Fixture> {
    let merged = self.reconcile(fixtures);
    let merged_count = merged.len();

    let real: Vec<Fixture> = merged
      .into_iter()
      .filter(|f| !self.has_placeholder_team(f))
      .collect();
    let real_count = real.len();

    let collapsed = collapse_future_duplicates(real, &self.normalizer);
    debug!(
      input = fixtures.len(),
      merged = merged_count,
      placeholders = merged_count - real_count,
      collapsed = real_count - collapsed.len(),
      canonical = collapsed.len(),
      "reconciled fixtures"
    );
    collapsed
  }

  /// Run the full pipeline against the London civil date of `now`.
  pub fn run(
    &self,
    fixtures: &[Fixture],
    now: DateTime<Utc>,
    config: &WindowConfig,
  ) -> Publication {
    let canonical = self.canonical(fixtures);
    let today = london_today(now);
    let windows = window::select(&canonical, today, config);
    let competitions = self.popularity.aggregate(&windows.upcoming);

    debug!(
      %today,
      upcoming = windows.upcoming.len(),
      recent = windows.recent.len(),
      fallback = windows.used_fallback,
      competitions = competitions.len(),
      "selected windows"
    );

    Publication {
      upcoming: windows.upcoming,
      recent: windows.recent,
      competitions,
      results_fell_back: windows.used_fallback,
    }
  }

  /// Top competitions on the coming weekend, over the canonical set.
  pub fn weekend_top(&self, fixtures: &[Fixture], now: DateTime<Utc>) -> Vec<Competition> {
    let canonical = self.canonical(fixtures);
    self.popularity.weekend_top(&canonical, london_today(now))
  }
}
