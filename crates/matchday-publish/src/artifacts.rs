//! [`ArtifactStore`]: the published output directory.

use std::path::{Path, PathBuf};

use matchday_core::Publication;
use serde::Serialize;
use strum::{AsRefStr, Display};
use tracing::info;

use crate::{Result, atomic};

// ─── Artifacts ───────────────────────────────────────────────────────────────

/// One published JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Artifact {
  /// Upcoming fixtures.
  Fixtures,
  /// Recent results.
  Results,
  Competitions,
}

impl Artifact {
  pub const ALL: [Artifact; 3] = [Artifact::Fixtures, Artifact::Results, Artifact::Competitions];

  pub fn file_name(&self) -> String { format!("{self}.json") }

  /// Fixture feeds are subject to per-record field validation.
  pub fn holds_fixtures(&self) -> bool { !matches!(self, Artifact::Competitions) }
}

/// What happened to one artifact during a publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
  /// The file was replaced with `count` entries.
  Written { count: usize },
  /// The new list was empty and the existing file was left untouched.
  Preserved,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Writes artifacts under one directory.
///
/// Each artifact is an independent, atomic decision: it is either fully
/// replaced or, under `preserve_on_empty`, left exactly as it was.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
  dir:               PathBuf,
  preserve_on_empty: bool,
}

impl ArtifactStore {
  pub fn new(dir: impl Into<PathBuf>, preserve_on_empty: bool) -> Self {
    Self {
      dir: dir.into(),
      preserve_on_empty,
    }
  }

  pub fn dir(&self) -> &Path { &self.dir }

  pub fn path(&self, artifact: Artifact) -> PathBuf { self.dir.join(artifact.file_name()) }

  /// Write one artifact, honouring `preserve_on_empty`.
  pub fn write<T: Serialize>(&self, artifact: Artifact, items: &[T]) -> Result<WriteOutcome> {
    let path = self.path(artifact);
    if self.preserve_on_empty && items.is_empty() && path.exists() {
      info!(%artifact, path = %path.display(), "empty list, keeping existing file");
      return Ok(WriteOutcome::Preserved);
    }
    atomic::write_json(&path, items)?;
    info!(%artifact, count = items.len(), path = %path.display(), "wrote artifact");
    Ok(WriteOutcome::Written { count: items.len() })
  }

  /// Write all three artifacts of a run.
  pub fn publish(&self, publication: &Publication) -> Result<Vec<(Artifact, WriteOutcome)>> {
    Ok(vec![
      (Artifact::Fixtures, self.write(Artifact::Fixtures, &publication.upcoming)?),
      (Artifact::Results, self.write(Artifact::Results, &publication.recent)?),
      (
        Artifact::Competitions,
        self.write(Artifact::Competitions, &publication.competitions)?,
      ),
    ])
  }
}
