//! Recognises team names that are tournament slots rather than real teams
//! ("Winner of QF1", "Group A runner-up", "TBC", "Dublin/Meath").

use crate::{normalize::normalize, tables::PlaceholderVocabulary};

/// Classifier over a [`PlaceholderVocabulary`].
#[derive(Debug, Clone)]
pub struct PlaceholderClassifier {
  vocabulary: PlaceholderVocabulary,
}

impl PlaceholderClassifier {
  pub fn new(vocabulary: PlaceholderVocabulary) -> Self { Self { vocabulary } }

  /// True if `name` denotes an undetermined slot rather than a team.
  pub fn is_placeholder(&self, name: &str) -> bool {
    // Hyphens survive normalisation; compare "quarter-final" as two tokens.
    let flat = normalize(name).replace('-', " ");
    let tokens: Vec<&str> = flat.split_whitespace().collect();
    if tokens.is_empty() {
      return false;
    }

    let v = &self.vocabulary;
    tokens.iter().any(|t| contains(&v.tokens, t))
      || any_phrase(&tokens, &v.phrases)
      || any_phrase(&tokens, &v.stage_markers)
      || followed_by(&tokens, &v.numbered_markers, is_number)
      || followed_by(&tokens, &v.group_markers, is_group_label)
      || tokens.iter().any(|t| self.is_stage_code(t))
      || self.is_slash_alternative(name, &tokens)
      || dotted_abbreviations(&tokens)
        .iter()
        .any(|abbr| contains(&v.tokens, abbr) || self.is_stage_code(abbr))
  }

  fn is_stage_code(&self, token: &str) -> bool {
    contains(&self.vocabulary.stage_codes, token)
      || self.vocabulary.numbered_codes.iter().any(|prefix| {
        token
          .strip_prefix(prefix.as_str())
          .is_some_and(|rest| (1..=2).contains(&rest.len()) && is_number(rest))
      })
  }

  /// `"X/Y"` names either of two undetermined teams, unless the text also
  /// carries an explicit versus marker (an abbreviated match title).
  fn is_slash_alternative(&self, raw: &str, tokens: &[&str]) -> bool {
    let Some((left, right)) = raw.split_once('/') else {
      return false;
    };
    if left.trim().is_empty() || right.trim().is_empty() {
      return false;
    }
    !tokens
      .iter()
      .any(|t| contains(&self.vocabulary.versus_markers, t))
  }
}

fn contains(list: &[String], token: &str) -> bool {
  list.iter().any(|entry| entry == token)
}

/// True if any phrase appears as a contiguous token run.
fn any_phrase(tokens: &[&str], phrases: &[String]) -> bool {
  phrases.iter().any(|phrase| {
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    !needle.is_empty()
      && needle.len() <= tokens.len()
      && tokens.windows(needle.len()).any(|w| w == needle.as_slice())
  })
}

/// True if a marker token is immediately followed by a token accepted by
/// `label`.
fn followed_by(
  tokens: &[&str],
  markers: &[String],
  label: fn(&str) -> bool,
) -> bool {
  tokens
    .windows(2)
    .any(|w| contains(markers, w[0]) && label(w[1]))
}

/// Runs of two or more single-letter tokens joined back together, so that
/// "T.B.C." (normalised to "t b c") reads as "tbc".
fn dotted_abbreviations(tokens: &[&str]) -> Vec<String> {
  tokens
    .chunk_by(|a, b| a.len() == 1 && b.len() == 1)
    .filter(|run| run.len() >= 2)
    .map(|run| run.concat())
    .collect()
}

fn is_number(token: &str) -> bool {
  !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

fn is_group_label(token: &str) -> bool {
  (token.len() == 1 && token.chars().all(|c| c.is_ascii_lowercase()))
    || (token.len() <= 2 && is_number(token))
}
