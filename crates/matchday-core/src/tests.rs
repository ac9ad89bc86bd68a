//! End-to-end scenarios for `Engine` over the built-in tables.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{
  Engine, Fixture, Source, SourcePriority, Status, Tables, WindowConfig,
};

fn engine() -> Engine {
  Engine::new(&Tables::builtin().expect("built-in tables"), SourcePriority::default())
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// A scheduled Dublin v Kerry league fixture from the registry.
fn base() -> Fixture {
  Fixture {
    id:           "base".into(),
    date:         NaiveDate::from_ymd_opt(2025, 11, 8).unwrap(),
    time:         NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
    competition:  "Division 2 League".into(),
    home:         "Dublin".into(),
    away:         "Kerry".into(),
    venue:        None,
    status:       Status::Scheduled,
    score:        String::new(),
    source:       Source::Registry,
    updated_at:   at(2025, 11, 1, 9, 0),
    search_index: None,
  }
}

fn with(id: &str, edit: impl FnOnce(&mut Fixture)) -> Fixture {
  let mut f = Fixture {
    id: id.into(),
    ..base()
  };
  edit(&mut f);
  f
}

fn ids(fixtures: &[Fixture]) -> Vec<&str> { fixtures.iter().map(|f| f.id.as_str()).collect() }

// ─── Reconciliation ──────────────────────────────────────────────────────────

#[test]
fn reconcile_is_idempotent() {
  let e = engine();
  let input = vec![
    with("a", |f| f.source = Source::Scraper),
    with("b", |_| {}),
    with("c", |f| {
      f.home = "Mayo".into();
      f.time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
    }),
    with("d", |f| {
      f.date = NaiveDate::from_ymd_opt(2025, 11, 2).unwrap();
      f.competition = "Junior Championship".into();
    }),
  ];
  let once = e.reconcile(&input);
  let twice = e.reconcile(&once);
  assert_eq!(once, twice);
  assert_eq!(ids(&once), vec!["d", "c", "b"]);
}

#[test]
fn nearby_kickoff_times_group_together() {
  let e = engine();
  let out = e.reconcile(&[
    with("late", |f| {
      f.time = NaiveTime::from_hms_opt(19, 32, 0).unwrap();
      f.source = Source::Calendar;
    }),
    with("exact", |f| f.source = Source::Calendar),
  ]);
  assert_eq!(out.len(), 1);
}

#[test]
fn source_priority_beats_recency_and_completeness() {
  let e = engine();
  let scraped = with("scraped", |f| {
    f.source = Source::Scraper;
    f.venue = Some("Croke Park".into());
    f.updated_at = at(2025, 11, 7, 12, 0);
  });
  let registry = with("registry", |f| f.updated_at = at(2025, 11, 1, 9, 0));
  let out = e.reconcile(&[scraped, registry]);
  assert_eq!(ids(&out), vec!["registry"]);
}

#[test]
fn completeness_breaks_same_source_ties() {
  let e = engine();
  let bare = with("bare", |f| f.source = Source::Club);
  let result = with("result", |f| {
    f.source = Source::Club;
    f.status = Status::Finished;
    f.score = "1-10 – 0-9".into();
  });
  let out = e.reconcile(&[bare, result]);
  assert_eq!(ids(&out), vec!["result"]);
}

#[test]
fn recency_breaks_remaining_ties() {
  let e = engine();
  let older = with("older", |_| {});
  let newer = with("newer", |f| f.updated_at = at(2025, 11, 5, 9, 0));
  assert_eq!(ids(&e.reconcile(&[older, newer])), vec!["newer"]);
}

#[test]
fn full_tie_keeps_first_in_input_order() {
  let e = engine();
  let out = e.reconcile(&[with("first", |_| {}), with("second", |_| {})]);
  assert_eq!(ids(&out), vec!["first"]);
  let out = e.reconcile(&[with("second", |_| {}), with("first", |_| {})]);
  assert_eq!(ids(&out), vec!["second"]);
}

#[test]
fn language_variants_share_a_group() {
  let e = engine();
  let irish = with("irish", |f| {
    f.away = "Ciarraí".into();
    f.source = Source::Scraper;
  });
  let english = with("english", |_| {});
  let out = e.reconcile(&[irish, english]);
  assert_eq!(ids(&out), vec!["english"]);
  let index = out[0].search_index.as_deref().unwrap();
  assert!(index.contains("dublin") && index.contains("kerry"));
}

#[test]
fn curly_and_straight_apostrophes_share_a_group() {
  let e = engine();
  let straight = with("straight", |f| f.home = "St. Vincent's".into());
  let curly = with("curly", |f| {
    f.home = "St. Vincent\u{2019}s".into();
    f.source = Source::Calendar;
  });
  let out = e.reconcile(&[curly, straight]);
  assert_eq!(ids(&out), vec!["straight"]);
}

#[test]
fn differing_competitions_stay_apart() {
  let e = engine();
  let out = e.reconcile(&[
    with("league", |_| {}),
    with("cup", |f| f.competition = "O'Byrne Cup".into()),
  ]);
  assert_eq!(out.len(), 2);
}

#[test]
fn custom_priority_is_honoured() {
  let tables = Tables::builtin().unwrap();
  let priority = SourcePriority::new(vec![Source::Scraper, Source::Registry]).unwrap();
  let e = Engine::new(&tables, priority);
  let out = e.reconcile(&[with("registry", |_| {}), with("scraped", |f| f.source = Source::Scraper)]);
  assert_eq!(ids(&out), vec!["scraped"]);
}

#[test]
fn inputs_are_not_mutated() {
  let e = engine();
  let input = vec![with("a", |_| {})];
  let before = input.clone();
  let _ = e.canonical(&input);
  assert_eq!(input, before);
  assert!(input[0].search_index.is_none());
}

#[test]
fn empty_input_yields_empty_output() {
  let e = engine();
  assert!(e.reconcile(&[]).is_empty());
  let p = e.run(&[], at(2025, 11, 1, 12, 0), &WindowConfig::default());
  assert!(p.upcoming.is_empty() && p.recent.is_empty() && p.competitions.is_empty());
}

// ─── Placeholders and collapsing ─────────────────────────────────────────────

#[test]
fn placeholder_teams_are_classified() {
  let e = engine();
  let c = e.placeholders();
  assert!(c.is_placeholder("Winner of Quarter-Final 1"));
  assert!(!c.is_placeholder("Dublin"));
  assert!(c.is_placeholder("Group A"));
  assert!(!c.is_placeholder("St. Vincent's"));
}

#[test]
fn placeholder_fixtures_are_excluded() {
  let e = engine();
  let out = e.canonical(&[
    with("slot", |f| f.away = "Winner of Quarter-Final 1".into()),
    with("group", |f| {
      f.home = "Group A".into();
      f.away = "Group B".into();
    }),
    with("real", |f| f.home = "St. Vincent's".into()),
  ]);
  assert_eq!(ids(&out), vec!["real"]);
}

#[test]
fn future_duplicates_collapse_to_earliest() {
  let e = engine();
  let early = with("early", |f| {
    f.date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
  });
  let late = with("late", |f| {
    f.date = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();
    f.competition = "Div. 2 Leauge".into();
  });
  assert_eq!(ids(&e.canonical(&[late.clone(), early.clone()])), vec!["early"]);

  let finished = Fixture {
    status: Status::Finished,
    ..late
  };
  assert_eq!(ids(&e.canonical(&[finished, early])), vec!["early", "late"]);
}

// ─── Windows ─────────────────────────────────────────────────────────────────

#[test]
fn upcoming_window_boundary() {
  let e = engine();
  let now = at(2025, 11, 1, 10, 0);
  let fixtures = vec![
    with("edge", |f| f.date = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap()),
    with("beyond", |f| {
      f.date = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
      f.home = "Mayo".into();
    }),
    with("scraped", |f| {
      f.date = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
      f.home = "Galway".into();
      f.source = Source::Scraper;
    }),
  ];

  let p = e.run(&fixtures, now, &WindowConfig::default());
  assert_eq!(ids(&p.upcoming), vec!["edge"]);

  let wide = WindowConfig {
    scraper_days_forward: 15,
    ..WindowConfig::default()
  };
  let p = e.run(&fixtures, now, &wide);
  assert_eq!(ids(&p.upcoming), vec!["edge", "scraped"]);
}

#[test]
fn competitions_come_from_upcoming_only() {
  let e = engine();
  let now = at(2025, 11, 1, 10, 0);
  let fixtures = vec![
    with("past", |f| {
      f.date = NaiveDate::from_ymd_opt(2025, 10, 30).unwrap();
      f.competition = "Ulster Senior Championship".into();
      f.status = Status::Finished;
      f.score = "2-10 – 1-11".into();
    }),
    with("future", |_| {}),
  ];
  let p = e.run(&fixtures, now, &WindowConfig::default());
  assert_eq!(ids(&p.recent), vec!["past"]);
  assert!(!p.results_fell_back);
  let names: Vec<_> = p.competitions.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, vec!["Division 2 League"]);
}

#[test]
fn results_fall_back_when_recent_is_empty() {
  let e = engine();
  let now = at(2025, 11, 1, 10, 0);
  let fixtures = vec![with("summer", |f| {
    f.date = NaiveDate::from_ymd_opt(2025, 7, 20).unwrap();
    f.status = Status::Finished;
  })];
  let p = e.run(&fixtures, now, &WindowConfig::default());
  assert!(p.results_fell_back);
  assert_eq!(ids(&p.recent), vec!["summer"]);
}

// ─── Competitions ────────────────────────────────────────────────────────────

#[test]
fn popularity_ranks_all_ireland_first() {
  let e = engine();
  assert_eq!(e.popularity().score("All-Ireland Senior Football Championship"), 160);
  assert_eq!(e.popularity().score("Division 2 League"), 30);

  let now = at(2025, 11, 1, 10, 0);
  let fixtures = vec![
    with("league", |_| {}),
    with("final", |f| {
      f.competition = "All-Ireland Senior Football Championship".into();
      f.date = NaiveDate::from_ymd_opt(2025, 11, 9).unwrap();
      f.home = "Armagh".into();
      f.away = "Galway".into();
    }),
  ];
  let p = e.run(&fixtures, now, &WindowConfig::default());
  let names: Vec<_> = p.competitions.iter().map(|c| c.name.as_str()).collect();
  assert_eq!(names, vec!["All-Ireland Senior Football Championship", "Division 2 League"]);
  assert_eq!(p.competitions[0].popularity, 160);
}

#[test]
fn weekend_top_uses_london_today() {
  let e = engine();
  // Friday 23:30 UTC in summer is already Saturday in London.
  let now = at(2025, 7, 4, 23, 30);
  let fixtures = vec![
    with("saturday", |f| {
      f.date = NaiveDate::from_ymd_opt(2025, 7, 5).unwrap();
      f.competition = "Munster Senior Championship".into();
    }),
    with("next-week", |f| {
      f.date = NaiveDate::from_ymd_opt(2025, 7, 12).unwrap();
      f.home = "Cork".into();
      f.competition = "All-Ireland Senior Football Championship".into();
    }),
  ];
  let top = e.weekend_top(&fixtures, now);
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].name, "Munster Senior Championship");
  assert_eq!(top[0].first_kickoff, at(2025, 7, 5, 18, 30));
}
