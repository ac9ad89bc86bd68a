//! iCalendar (RFC 5545) reader for `VEVENT` components.
//!
//! Pipeline:
//!   raw &str
//!     └─ unfold_lines()          → Vec<String>
//!          └─ parse_content_line() → ContentLine
//!               └─ EventBuilder     → Vec<Event>
//!
//! Only the properties the fixture decoders need are kept. Nested components
//! (`VALARM` and friends) are skipped.

use chrono::{
  DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc,
};
use chrono_tz::{Europe::London, Tz};
use tracing::debug;

use crate::error::{Error, Result};

// ─── Content-line representation ─────────────────────────────────────────────

struct ContentLine {
  name:   String,
  params: Vec<Param>,
  value:  String,
}

struct Param {
  name:  String,
  value: String,
}

impl ContentLine {
  fn param(&self, name: &str) -> Option<&str> {
    self
      .params
      .iter()
      .find(|p| p.name.eq_ignore_ascii_case(name))
      .map(|p| p.value.as_str())
  }
}

// ─── Low-level helpers ───────────────────────────────────────────────────────

/// Join CRLF+SP (or LF+SP / LF+HT) continuation lines (RFC 5545 §3.1).
/// Tolerates bare LF line endings.
pub(crate) fn unfold_lines(s: &str) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  for raw in s.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if let Some(rest) = line.strip_prefix([' ', '\t']) {
      if let Some(last) = lines.last_mut() {
        last.push_str(rest);
      }
    } else {
      lines.push(line.to_string());
    }
  }
  lines.retain(|l| !l.trim().is_empty());
  lines
}

/// Find the first `:` that is not inside a double-quoted parameter value.
fn find_unquoted_colon(s: &str) -> Option<usize> {
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ':' if !in_quotes => return Some(i),
      _ => {}
    }
  }
  None
}

/// Split on `;` while respecting double-quoted strings.
fn split_semicolons_respecting_quotes(s: &str) -> Vec<&str> {
  let mut result = Vec::new();
  let mut start = 0usize;
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ';' if !in_quotes => {
        result.push(&s[start..i]);
        start = i + 1;
      }
      _ => {}
    }
  }
  result.push(&s[start..]);
  result
}

fn parse_content_line(line: &str) -> Result<ContentLine> {
  let colon_pos = find_unquoted_colon(line)
    .ok_or_else(|| Error::MalformedContentLine(line.to_string()))?;

  let tokens = split_semicolons_respecting_quotes(&line[..colon_pos]);
  let name = tokens[0].trim().to_uppercase();
  if name.is_empty() {
    return Err(Error::MalformedContentLine(line.to_string()));
  }

  let params = tokens[1..]
    .iter()
    .filter_map(|token| {
      let (k, v) = token.split_once('=')?;
      Some(Param {
        name:  k.trim().to_uppercase(),
        value: v.trim().trim_matches('"').to_string(),
      })
    })
    .collect();

  Ok(ContentLine {
    name,
    params,
    value: line[colon_pos + 1..].to_string(),
  })
}

/// Undo RFC 5545 TEXT escaping.
fn unescape_text(s: &str) -> String {
  let mut result = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      result.push(c);
      continue;
    }
    match chars.next() {
      Some('n') | Some('N') => result.push('\n'),
      Some(other @ ('\\' | ',' | ';')) => result.push(other),
      Some(other) => {
        result.push('\\');
        result.push(other);
      }
      None => result.push('\\'),
    }
  }
  result
}

/// Split a multi-valued TEXT on commas that are not backslash-escaped.
fn split_text_list(s: &str) -> Vec<String> {
  let mut items = Vec::new();
  let mut current = String::new();
  let mut escaped = false;
  for c in s.chars() {
    if escaped {
      current.push('\\');
      current.push(c);
      escaped = false;
    } else if c == '\\' {
      escaped = true;
    } else if c == ',' {
      items.push(std::mem::take(&mut current));
    } else {
      current.push(c);
    }
  }
  items.push(current);
  items
    .iter()
    .map(|item| unescape_text(item).trim().to_string())
    .filter(|item| !item.is_empty())
    .collect()
}

// ─── Event start ─────────────────────────────────────────────────────────────

/// `DTSTART` in one of its RFC 5545 shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Start {
  /// UTC (`...Z`) or `TZID`-qualified; resolved to an instant.
  Instant(DateTime<Utc>),
  /// Floating local time, or a `TZID` this build does not know.
  Local(NaiveDateTime),
  /// `VALUE=DATE`.
  AllDay(NaiveDate),
}

impl Start {
  /// Europe/London civil date and whole-minute time of day.
  pub fn london(&self) -> (NaiveDate, NaiveTime) {
    let local = match *self {
      Start::Instant(instant) => instant.with_timezone(&London).naive_local(),
      Start::Local(local) => local,
      Start::AllDay(date) => return (date, NaiveTime::MIN),
    };
    let time = local.time();
    let minute = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time);
    (local.date(), minute)
  }
}

fn parse_start(line: &ContentLine) -> Result<Start> {
  let value = line.value.trim();
  let invalid = || Error::InvalidDateTime {
    property: line.name.clone(),
    value:    value.to_string(),
  };

  let is_date = line
    .param("VALUE")
    .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
    || value.len() == 8;
  if is_date {
    return NaiveDate::parse_from_str(value, "%Y%m%d")
      .map(Start::AllDay)
      .map_err(|_| invalid());
  }

  let (naive_text, is_utc) = match value.strip_suffix(['Z', 'z']) {
    Some(rest) => (rest, true),
    None => (value, false),
  };
  let naive = NaiveDateTime::parse_from_str(naive_text, "%Y%m%dT%H%M%S")
    .or_else(|_| NaiveDateTime::parse_from_str(naive_text, "%Y%m%dT%H%M"))
    .map_err(|_| invalid())?;

  if is_utc {
    return Ok(Start::Instant(naive.and_utc()));
  }

  let Some(tzid) = line.param("TZID") else {
    return Ok(Start::Local(naive));
  };
  match tzid.parse::<Tz>() {
    Ok(tz) => Ok(
      tz.from_local_datetime(&naive)
        .earliest()
        .map_or(Start::Local(naive), |dt| Start::Instant(dt.with_timezone(&Utc))),
    ),
    Err(_) => {
      debug!(tzid, "unknown TZID, treating start as London local time");
      Ok(Start::Local(naive))
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// The parts of a `VEVENT` the decoders use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
  pub uid:        Option<String>,
  pub start:      Start,
  pub summary:    String,
  pub location:   Option<String>,
  pub categories: Vec<String>,
}

#[derive(Default)]
struct EventBuilder {
  uid:        Option<String>,
  start:      Option<Start>,
  summary:    String,
  location:   Option<String>,
  categories: Vec<String>,
}

impl EventBuilder {
  fn apply(&mut self, line: &ContentLine) {
    match line.name.as_str() {
      "UID" => self.uid = non_empty(line.value.trim()),
      "SUMMARY" => self.summary = unescape_text(&line.value).trim().to_string(),
      "LOCATION" => self.location = non_empty(unescape_text(&line.value).trim()),
      "CATEGORIES" => self.categories.extend(split_text_list(&line.value)),
      "DTSTART" => match parse_start(line) {
        Ok(start) => self.start = Some(start),
        Err(e) => debug!(error = %e, "skipping unreadable DTSTART"),
      },
      _ => {}
    }
  }

  fn finish(self) -> Option<Event> {
    Some(Event {
      uid:        self.uid,
      start:      self.start?,
      summary:    self.summary,
      location:   self.location,
      categories: self.categories,
    })
  }
}

fn non_empty(s: &str) -> Option<String> {
  if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Parse every `VEVENT` in a calendar document.
///
/// Events without a readable `DTSTART` are dropped; malformed content lines
/// are skipped. Only a missing `VCALENDAR` envelope is an error.
pub fn parse_events(input: &str) -> Result<Vec<Event>> {
  let lines = unfold_lines(input);
  if !lines.iter().any(|l| l.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR")) {
    return Err(Error::MissingEnvelope);
  }

  let mut events = Vec::new();
  let mut current: Option<EventBuilder> = None;
  let mut nested = 0usize;

  for raw in &lines {
    let line = match parse_content_line(raw) {
      Ok(line) => line,
      Err(e) => {
        debug!(error = %e, "skipping content line");
        continue;
      }
    };
    let value = line.value.trim();

    match line.name.as_str() {
      "BEGIN" if value.eq_ignore_ascii_case("VEVENT") && current.is_none() => {
        current = Some(EventBuilder::default());
        nested = 0;
      }
      "END" if value.eq_ignore_ascii_case("VEVENT") && nested == 0 => {
        if let Some(builder) = current.take() {
          match builder.finish() {
            Some(event) => events.push(event),
            None => debug!("dropping VEVENT without DTSTART"),
          }
        }
      }
      "BEGIN" if current.is_some() => nested += 1,
      "END" if current.is_some() && nested > 0 => nested -= 1,
      _ => {
        if nested == 0
          && let Some(builder) = current.as_mut()
        {
          builder.apply(&line);
        }
      }
    }
  }

  Ok(events)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn calendar(body: &str) -> String {
    format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n{body}END:VCALENDAR\r\n")
  }

  fn single(body: &str) -> Event {
    let events = parse_events(&calendar(body)).unwrap();
    assert_eq!(events.len(), 1);
    events.into_iter().next().unwrap()
  }

  #[test]
  fn missing_envelope_is_an_error() {
    assert!(matches!(
      parse_events("BEGIN:VEVENT\r\nEND:VEVENT\r\n"),
      Err(Error::MissingEnvelope)
    ));
  }

  #[test]
  fn folded_lines_unfold() {
    let event = single(
      "BEGIN:VEVENT\r\nDTSTART:20251108T193000Z\r\nSUMMARY:Dublin v \r\n \
       Kerry\r\nEND:VEVENT\r\n",
    );
    assert_eq!(event.summary, "Dublin v Kerry");
  }

  #[test]
  fn utc_start_converts_to_london() {
    let event = single("BEGIN:VEVENT\r\nDTSTART:20250712T140000Z\r\nEND:VEVENT\r\n");
    let (date, time) = event.start.london();
    assert_eq!(date, NaiveDate::from_ymd_opt(2025, 7, 12).unwrap());
    assert_eq!(time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
  }

  #[test]
  fn tzid_start_resolves_through_zone() {
    let event = single(
      "BEGIN:VEVENT\r\nDTSTART;TZID=\"Europe/Dublin\":20250712T150000\r\nEND:VEVENT\r\n",
    );
    assert_eq!(
      event.start,
      Start::Instant(Utc.with_ymd_and_hms(2025, 7, 12, 14, 0, 0).unwrap())
    );
    assert_eq!(event.start.london().1, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
  }

  #[test]
  fn unknown_tzid_is_local() {
    let event =
      single("BEGIN:VEVENT\r\nDTSTART;TZID=Club/Local:20251108T193000\r\nEND:VEVENT\r\n");
    assert!(matches!(event.start, Start::Local(_)));
  }

  #[test]
  fn floating_and_all_day_starts() {
    let floating = single("BEGIN:VEVENT\r\nDTSTART:20251108T1930\r\nEND:VEVENT\r\n");
    assert_eq!(floating.start.london().1, NaiveTime::from_hms_opt(19, 30, 0).unwrap());

    let all_day = single("BEGIN:VEVENT\r\nDTSTART;VALUE=DATE:20251108\r\nEND:VEVENT\r\n");
    assert_eq!(
      all_day.start.london(),
      (NaiveDate::from_ymd_opt(2025, 11, 8).unwrap(), NaiveTime::MIN)
    );
  }

  #[test]
  fn text_is_unescaped_and_categories_split() {
    let event = single(
      "BEGIN:VEVENT\r\nDTSTART:20251108T193000Z\r\nLOCATION:Parnell Park\\, \
       Donnycarney\r\nCATEGORIES:Senior Football\\, Division 2,Adult\r\nEND:VEVENT\r\n",
    );
    assert_eq!(event.location.as_deref(), Some("Parnell Park, Donnycarney"));
    assert_eq!(event.categories, vec!["Senior Football, Division 2", "Adult"]);
  }

  #[test]
  fn nested_alarm_does_not_leak() {
    let event = single(
      "BEGIN:VEVENT\r\nDTSTART:20251108T193000Z\r\nSUMMARY:Dublin v Kerry\r\n\
       BEGIN:VALARM\r\nSUMMARY:Reminder\r\nEND:VALARM\r\nUID:abc-1\r\nEND:VEVENT\r\n",
    );
    assert_eq!(event.summary, "Dublin v Kerry");
    assert_eq!(event.uid.as_deref(), Some("abc-1"));
  }

  #[test]
  fn events_without_start_are_dropped() {
    let events = parse_events(&calendar(
      "BEGIN:VEVENT\r\nSUMMARY:No date\r\nEND:VEVENT\r\n\
       BEGIN:VEVENT\r\nDTSTART:garbage\r\nEND:VEVENT\r\n\
       BEGIN:VEVENT\r\nDTSTART:20251108T193000Z\r\nEND:VEVENT\r\n",
    ))
    .unwrap();
    assert_eq!(events.len(), 1);
  }

  #[test]
  fn malformed_lines_are_skipped() {
    let event = single(
      "BEGIN:VEVENT\r\nthis line has no colon\r\nDTSTART:20251108T193000Z\r\nEND:VEVENT\r\n",
    );
    assert!(event.uid.is_none());
  }
}
