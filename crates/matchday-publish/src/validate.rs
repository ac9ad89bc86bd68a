//! Publication-time validation of the output directory.

use std::{fmt, fs};

use serde_json::Value;

use crate::artifacts::{Artifact, ArtifactStore};

/// Fields every published fixture must carry with a non-empty value.
pub const REQUIRED_FIELDS: [&str; 9] = [
  "id",
  "date",
  "time",
  "competition",
  "home",
  "away",
  "status",
  "source",
  "updated_at",
];

/// One problem found in the published output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
  Missing(Artifact),
  Unreadable { artifact: Artifact, reason: String },
  NotAList(Artifact),
  /// Entry `index` lacks `field` (only the first missing field is reported).
  MissingField {
    artifact: Artifact,
    index:    usize,
    field:    &'static str,
  },
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Violation::Missing(a) => write!(f, "missing {}", a.file_name()),
      Violation::Unreadable { artifact, reason } => {
        write!(f, "{} unreadable: {reason}", artifact.file_name())
      }
      Violation::NotAList(a) => write!(f, "{} not a list", a.file_name()),
      Violation::MissingField {
        artifact,
        index,
        field,
      } => write!(f, "{}[{index}] missing {field}", artifact.file_name()),
    }
  }
}

fn is_blank(value: Option<&Value>) -> bool {
  match value {
    None | Some(Value::Null) => true,
    Some(Value::String(s)) => s.is_empty(),
    Some(_) => false,
  }
}

/// Check every artifact in `store`. An empty result means the output is
/// publishable.
pub fn validate(store: &ArtifactStore) -> Vec<Violation> {
  let mut violations = Vec::new();

  for artifact in Artifact::ALL {
    let path = store.path(artifact);
    if !path.exists() {
      violations.push(Violation::Missing(artifact));
      continue;
    }

    let parsed = fs::read_to_string(&path)
      .map_err(|e| e.to_string())
      .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
    let entries = match parsed {
      Ok(Value::Array(entries)) => entries,
      Ok(_) => {
        violations.push(Violation::NotAList(artifact));
        continue;
      }
      Err(reason) => {
        violations.push(Violation::Unreadable { artifact, reason });
        continue;
      }
    };

    if !artifact.holds_fixtures() {
      continue;
    }
    for (index, entry) in entries.iter().enumerate() {
      if let Some(field) = REQUIRED_FIELDS
        .into_iter()
        .find(|field| is_blank(entry.get(*field)))
      {
        violations.push(Violation::MissingField {
          artifact,
          index,
          field,
        });
      }
    }
  }

  violations
}
