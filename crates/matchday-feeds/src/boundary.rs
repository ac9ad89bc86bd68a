//! Admission check at the collaborator boundary. The engine assumes every
//! required field is populated; records that are not never reach it.

use matchday_core::Fixture;
use tracing::debug;

/// Name of the first required text field that is blank, if any.
pub fn missing_field(fixture: &Fixture) -> Option<&'static str> {
  [
    ("id", &fixture.id),
    ("competition", &fixture.competition),
    ("home", &fixture.home),
    ("away", &fixture.away),
  ]
  .into_iter()
  .find_map(|(name, value)| value.trim().is_empty().then_some(name))
}

/// Keep only records with every required field populated.
pub fn admit(fixtures: Vec<Fixture>) -> Vec<Fixture> {
  fixtures
    .into_iter()
    .filter(|f| match missing_field(f) {
      Some(field) => {
        debug!(id = %f.id, source = %f.source, field, "dropping incomplete record");
        false
      }
      None => true,
    })
    .collect()
}
