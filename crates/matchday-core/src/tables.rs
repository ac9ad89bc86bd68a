//! Static lookup tables: the language-variant token map, popularity keyword
//! rules, and placeholder vocabulary.
//!
//! The tables are versioned data, not control flow. A default document is
//! compiled in; callers may parse a replacement once at start-up and hand the
//! resulting [`Tables`] to the [`Engine`](crate::Engine).

use std::collections::HashMap;

use serde::Deserialize;

use crate::Result;

const BUILTIN: &str = include_str!("../data/tables.toml");

/// Parsed lookup tables. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct Tables {
  /// Free-form version tag of the document.
  pub version:     String,
  /// Regional-language token → common-language token.
  #[serde(default)]
  pub token_map:   HashMap<String, String>,
  #[serde(default)]
  pub popularity:  Vec<PopularityRule>,
  #[serde(default)]
  pub placeholder: PlaceholderVocabulary,
}

/// One additive popularity rule. It matches when any `keywords` entry is a
/// substring of the lowercase name, or when every `all_of` entry appears in
/// the name in the listed order (other words may sit between them).
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PopularityRule {
  #[serde(default)]
  pub keywords: Vec<String>,
  #[serde(default)]
  pub all_of:   Vec<String>,
  pub score:    u32,
}

impl PopularityRule {
  /// `lower` must already be lowercase.
  pub fn matches(&self, lower: &str) -> bool {
    self.keywords.iter().any(|k| lower.contains(k.as_str())) || self.matches_all_of(lower)
  }

  fn matches_all_of(&self, lower: &str) -> bool {
    if self.all_of.is_empty() {
      return false;
    }
    let mut rest = lower;
    for word in &self.all_of {
      let Some(at) = rest.find(word.as_str()) else {
        return false;
      };
      rest = &rest[at + word.len()..];
    }
    true
  }
}

/// Vocabulary used by the placeholder classifier. Every entry is written in
/// normalised form (see [`crate::normalize::normalize`]).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceholderVocabulary {
  #[serde(default)]
  pub tokens:           Vec<String>,
  #[serde(default)]
  pub phrases:          Vec<String>,
  #[serde(default)]
  pub stage_markers:    Vec<String>,
  #[serde(default)]
  pub numbered_markers: Vec<String>,
  #[serde(default)]
  pub group_markers:    Vec<String>,
  #[serde(default)]
  pub stage_codes:      Vec<String>,
  #[serde(default)]
  pub numbered_codes:   Vec<String>,
  #[serde(default)]
  pub versus_markers:   Vec<String>,
}

impl Tables {
  /// The compiled-in default tables.
  pub fn builtin() -> Result<Self> { Self::from_toml(BUILTIN) }

  /// Parse a tables document.
  pub fn from_toml(source: &str) -> Result<Self> {
    Ok(toml::from_str(source)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_tables_parse() {
    let tables = Tables::builtin().unwrap();
    assert!(!tables.version.is_empty());
    assert_eq!(tables.token_map.get("ciarrai").map(String::as_str), Some("kerry"));
    assert_eq!(tables.popularity.len(), 8);
    assert!(tables.placeholder.tokens.iter().any(|t| t == "tbd"));
    assert!(tables.placeholder.versus_markers.iter().any(|t| t == "vs"));
  }

  #[test]
  fn builtin_popularity_rules_are_ordered_as_written() {
    let tables = Tables::builtin().unwrap();
    let first = &tables.popularity[0];
    assert_eq!(first.keywords, vec!["all-ireland".to_string()]);
    assert_eq!(first.score, 100);
    let last = tables.popularity.last().unwrap();
    assert_eq!(last.score, 10);
  }

  #[test]
  fn minimal_document_defaults_sections() {
    let tables = Tables::from_toml("version = \"test\"\n").unwrap();
    assert!(tables.token_map.is_empty());
    assert!(tables.popularity.is_empty());
    assert!(tables.placeholder.phrases.is_empty());
  }

  #[test]
  fn ordered_words_match_with_gaps() {
    let rule = PopularityRule {
      all_of: vec!["senior".into(), "championship".into()],
      score: 60,
      ..PopularityRule::default()
    };
    assert!(rule.matches("all-ireland senior football championship"));
    assert!(rule.matches("senior championship"));
    assert!(!rule.matches("championship senior"));
    assert!(!rule.matches("junior football championship"));
  }

  #[test]
  fn rule_without_keywords_or_words_never_matches() {
    let rule = PopularityRule {
      score: 5,
      ..PopularityRule::default()
    };
    assert!(!rule.matches("anything"));
  }

  #[test]
  fn malformed_document_is_an_error() {
    assert!(Tables::from_toml("version = [").is_err());
  }
}
