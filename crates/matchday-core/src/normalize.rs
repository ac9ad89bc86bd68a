//! Text normalisation, language-variant token mapping, and slugs.
//!
//! Pipeline for comparison keys:
//!   raw name
//!     └─ normalize()        → lowercase ASCII, `[a-z0-9 -]` only
//!          └─ map_tokens()  → regional spellings replaced token-by-token
//!               └─ normalize() again → team key

use std::collections::HashMap;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{model::Fixture, tables::Tables};

/// Lowercase, decompose and drop combining marks (diacritics), replace
/// anything else outside `[a-z0-9 -]` with a space, collapse whitespace, trim.
///
/// Total over any input, including the empty string.
pub fn normalize(text: &str) -> String {
  let cleaned: String = text
    .to_lowercase()
    .nfd()
    .filter(|c| !is_combining_mark(*c))
    .map(|c| {
      if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
        c
      } else {
        ' '
      }
    })
    .collect();
  cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// URL-safe slug: compatibility-decomposed ASCII, lowercase, punctuation
/// removed, whitespace runs become single hyphens, no leading/trailing or
/// doubled hyphens.
pub fn slugify(text: &str) -> String {
  let ascii: String = text
    .nfkd()
    .filter(char::is_ascii)
    .collect::<String>()
    .to_lowercase()
    .chars()
    .filter(|c| {
      c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-'
    })
    .collect();

  let hyphenated = ascii.split_whitespace().collect::<Vec<_>>().join("-");
  let mut slug = String::with_capacity(hyphenated.len());
  for c in hyphenated.trim_matches('-').chars() {
    if c == '-' && slug.ends_with('-') {
      continue;
    }
    slug.push(c);
  }
  slug
}

/// Token-level normaliser backed by the language-variant lookup table.
#[derive(Debug, Clone)]
pub struct Normalizer {
  token_map: HashMap<String, String>,
}

impl Normalizer {
  pub fn new(tables: &Tables) -> Self {
    Self {
      token_map: tables.token_map.clone(),
    }
  }

  /// Normalise, then replace each token found in the variant table.
  pub fn map_tokens(&self, text: &str) -> String {
    normalize(text)
      .split(' ')
      .map(|tok| self.token_map.get(tok).map_or(tok, String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Comparison key for a team name.
  pub fn team_key(&self, name: &str) -> String {
    normalize(&self.map_tokens(name))
  }

  /// Haystack over home, away, competition and venue holding both the
  /// original and the token-mapped spellings.
  pub fn search_index(&self, fixture: &Fixture) -> String {
    let haystack = [
      fixture.home.as_str(),
      fixture.away.as_str(),
      fixture.competition.as_str(),
      fixture.venue.as_deref().unwrap_or(""),
    ]
    .join(" ");
    let original = normalize(&haystack);
    let mapped = normalize(&self.map_tokens(&haystack));
    normalize(&format!("{original} {mapped}"))
  }

  /// Return `fixture` with its search index derived. The input is untouched.
  pub fn index(&self, fixture: &Fixture) -> Fixture {
    fixture.with_search_index(self.search_index(fixture))
  }
}
