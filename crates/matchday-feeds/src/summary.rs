//! Heuristics for calendar event titles such as
//! `"Senior Football League – Dublin v Kerry"` or
//! `"Dublin vs Kerry 1-10 – 0-09 (Division 2)"`.

use regex::Regex;

/// Pieces recovered from one event title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
  pub home:        String,
  pub away:        String,
  pub competition: Option<String>,
  /// `"G-P – G-P"`, or empty.
  pub score:       String,
}

/// Compiled title patterns.
#[derive(Debug, Clone)]
pub struct SummaryParser {
  versus:    Regex,
  score:     Regex,
  separator: Regex,
}

impl SummaryParser {
  pub fn new() -> crate::Result<Self> {
    Ok(Self {
      versus:    Regex::new(r"(?i)\s+(?:v|vs|versus)\.?\s+")?,
      score:     Regex::new(r"(\d+\s*-\s*\d+)\s*[–-]\s*(\d+\s*-\s*\d+)")?,
      separator: Regex::new(r"\s[–—-]\s")?,
    })
  }

  pub fn parse(&self, title: &str) -> Summary {
    let mut summary = Summary::default();

    let mut rest = title.to_string();
    if let Some(caps) = self.score.captures(title) {
      let squash = |s: &str| s.split_whitespace().collect::<String>();
      summary.score = format!("{} – {}", squash(&caps[1]), squash(&caps[2]));
      rest = self.score.replace(title, " ").into_owned();
    }

    let (teams, competition) = self.split_competition(rest.trim());
    summary.competition = competition;

    let mut sides = self.versus.splitn(teams, 2);
    let home = sides.next().unwrap_or_default();
    if let Some(away) = sides.next() {
      summary.home = home
        .trim_matches(|c: char| matches!(c, '-' | '–' | ',') || c.is_whitespace())
        .to_string();
      let cut = away.find(['(', '[']).unwrap_or(away.len());
      summary.away = away[..cut].trim().to_string();
    } else {
      summary.home = home.trim().to_string();
    }
    summary
  }

  /// Separate a competition label from the team part of a title.
  ///
  /// Tried in order: a leading `"Comp – "` prefix, a trailing `" - Comp"`
  /// suffix, a trailing `" (Comp)"`.
  fn split_competition<'t>(&self, text: &'t str) -> (&'t str, Option<String>) {
    let parts: Vec<&str> = self.separator.splitn(text, 2).collect();
    if let [first, second] = parts[..] {
      let (first_vs, second_vs) = (self.versus.is_match(first), self.versus.is_match(second));
      if !first_vs && second_vs {
        return (second, label(first));
      }
      if first_vs && !second_vs {
        return (first, label(second));
      }
    }

    if let Some(inner) = text.strip_suffix(')')
      && let Some(open) = inner.rfind(" (")
      && !self.versus.is_match(&inner[open..])
    {
      return (&text[..open], label(&inner[open + 2..]));
    }

    (text, None)
  }
}

fn label(s: &str) -> Option<String> {
  let s = s.trim();
  if s.is_empty() { None } else { Some(s.to_string()) }
}

// ─── Adult football filter ───────────────────────────────────────────────────

/// Markers of other codes (hurling, camogie, ladies) and underage grades.
const EXCLUDE_TOKENS: &[&str] = &[
  "hurl", "hurling", "camogie", "ladies", "lgfa", "women", "girls", "shc",
  "ihc", "jhc", "u7", "u8", "u9", "u10", "u11", "u12", "u13", "u14", "u15",
  "u16", "u17", "u18", "u19", "u20", "u21", "under", "minor", "academy",
  "schools", "freshers", "hec", "higher education",
];

/// Adult grade words accepted when "football" itself is absent.
const FOOTBALL_HINTS: &[&str] = &[
  "football", "senior", "intermediate", "junior", "division", "league",
  "championship", "sfc", "ifc", "jfc",
];

/// True if `text` (competition and title) looks like an adult men's football
/// fixture. Substring matching, case-insensitive.
pub fn is_adult_football(text: &str) -> bool {
  let lower = text.to_lowercase();
  if EXCLUDE_TOKENS.iter().any(|t| lower.contains(t)) {
    return false;
  }
  FOOTBALL_HINTS.iter().any(|t| lower.contains(t))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(title: &str) -> Summary { SummaryParser::new().unwrap().parse(title) }

  #[test]
  fn plain_versus() {
    let s = parse("Dublin v Kerry");
    assert_eq!((s.home.as_str(), s.away.as_str()), ("Dublin", "Kerry"));
    assert!(s.competition.is_none());
    assert!(s.score.is_empty());
  }

  #[test]
  fn versus_spellings() {
    for title in ["Na Fianna vs St. Vincent's", "Na Fianna VERSUS St. Vincent's", "Na Fianna v. St. Vincent's"] {
      let s = parse(title);
      assert_eq!(s.home, "Na Fianna", "{title}");
      assert_eq!(s.away, "St. Vincent's", "{title}");
    }
  }

  #[test]
  fn competition_suffix() {
    let s = parse("Dublin vs Kerry - Division 2 League");
    assert_eq!(s.away, "Kerry");
    assert_eq!(s.competition.as_deref(), Some("Division 2 League"));
  }

  #[test]
  fn competition_prefix() {
    let s = parse("Senior Football League – Castlebar Mitchels v Ballina Stephenites");
    assert_eq!(s.home, "Castlebar Mitchels");
    assert_eq!(s.away, "Ballina Stephenites");
    assert_eq!(s.competition.as_deref(), Some("Senior Football League"));
  }

  #[test]
  fn competition_in_parentheses() {
    let s = parse("Dublin v Kerry (Allianz League)");
    assert_eq!(s.away, "Kerry");
    assert_eq!(s.competition.as_deref(), Some("Allianz League"));
  }

  #[test]
  fn score_is_extracted_and_squashed() {
    let s = parse("Dublin v Kerry 1 - 10 – 0-9");
    assert_eq!(s.score, "1-10 – 0-9");
    assert_eq!(s.away, "Kerry");
    assert!(s.competition.is_none());
  }

  #[test]
  fn title_without_versus_has_no_away() {
    let s = parse("Club AGM");
    assert_eq!(s.home, "Club AGM");
    assert!(s.away.is_empty());
  }

  #[test]
  fn adult_football_filter() {
    assert!(is_adult_football("Senior Football Championship Dublin v Kerry"));
    assert!(is_adult_football("Division 3 League"));
    assert!(!is_adult_football("Senior Hurling Championship"));
    assert!(!is_adult_football("U14 Football League"));
    assert!(!is_adult_football("Ladies Junior Football"));
    assert!(!is_adult_football("Club Social Night"));
  }
}
