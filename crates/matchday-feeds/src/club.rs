//! Decoder for the club-management platform, whose API already serves records
//! in fixture shape.

use chrono::{DateTime, Utc};
use matchday_core::{Fixture, Source};

use crate::{error::Result, payload};

/// Decode one organisation's fixture list, tagged as the club platform. A
/// missing `updated_at` is filled with `fetched_at`; items that do not
/// deserialise are dropped.
pub fn decode(body: &str, fetched_at: DateTime<Utc>) -> Result<Vec<Fixture>> {
  payload::fixture_records(body, Source::Club, fetched_at)
}
