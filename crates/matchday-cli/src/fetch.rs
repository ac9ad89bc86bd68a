//! Fetching every enabled source and writing the raw cache.
//!
//! Pipeline:
//! ```text
//! registry ─┐
//! club     ─┤  (concurrent, each with retries)
//! calendar ─┤─► admit ─► <source>_raw.json / <source>_error.log
//! scraper  ─┘                 │
//!                             └─► combined_raw.json (fixed source order)
//! ```

use std::time::Duration;

use anyhow::{Context as _, Result, anyhow, bail};
use chrono::{DateTime, Days, NaiveDate, Utc};
use matchday_core::{Fixture, Source, window::london_today};
use matchday_feeds::{CalendarFeed, boundary, calendar, club, registry};
use matchday_publish::RawCache;
use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use crate::{
  retry::{RetryPolicy, retry_async},
  settings::Settings,
};

/// Guard against a registry that never returns a short page.
const MAX_PAGES: u32 = 100;

const LEGACY_PATH: &str = "/api/fixtures/jsonp";

const CALENDAR_MARKER: &str = "BEGIN:VCALENDAR";

// ─── Fetcher ──────────────────────────────────────────────────────────────────

pub struct Fetcher<'a> {
  client:   Client,
  settings: &'a Settings,
  retry:    RetryPolicy,
}

impl<'a> Fetcher<'a> {
  pub fn new(settings: &'a Settings) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(20))
      .connect_timeout(Duration::from_secs(10))
      .user_agent(concat!("matchday/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      settings,
      retry: RetryPolicy::default(),
    })
  }

  /// `GET url` with retries, returning the body of a successful response.
  async fn get_text(
    &self,
    url: &str,
    query: &[(&str, String)],
    bearer: Option<&str>,
  ) -> Result<String> {
    let client = &self.client;
    retry_async(&self.retry, url, move || async move {
      let mut req = client.get(url).query(query);
      if let Some(token) = bearer {
        req = req.bearer_auth(token);
      }
      let resp = req.send().await?.error_for_status()?;
      anyhow::Ok(resp.text().await?)
    })
    .await
  }

  /// Every enabled source, concurrently, in [`Source::ALL`] order.
  pub async fn fetch_all(&self, now: DateTime<Utc>) -> Vec<(Source, Result<Vec<Fixture>>)> {
    let sources = &self.settings.sources;
    let (registry, club, calendar, scraper) = tokio::join!(
      async { if sources.registry.enabled { Some(self.registry(now).await) } else { None } },
      async { if sources.club.enabled { Some(self.club(now).await) } else { None } },
      async { if sources.calendar.enabled { Some(self.calendar(now).await) } else { None } },
      async { if sources.scraper.enabled { Some(self.scraper(now).await) } else { None } },
    );

    Source::ALL
      .into_iter()
      .zip([registry, club, calendar, scraper])
      .filter_map(|(source, result)| result.map(|r| (source, r)))
      .collect()
  }

  // ── Registry ──────────────────────────────────────────────────────────────

  /// The open-data feed, falling back to the legacy endpoint when it yields
  /// nothing and a legacy base URL is configured.
  pub async fn registry(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let cfg = &self.settings.sources.registry;
    if cfg.base_url.is_empty() && cfg.legacy_base_url.is_empty() {
      bail!("sources.registry.base_url is not set");
    }
    let open_data = if cfg.base_url.is_empty() {
      Ok(Vec::new())
    } else {
      self.registry_open_data(now).await
    };
    if !needs_legacy(&open_data, &cfg.legacy_base_url) {
      return open_data;
    }
    match &open_data {
      Ok(_) => info!("registry open data is empty, trying legacy endpoint"),
      Err(e) => warn!(error = %format!("{e:#}"), "registry open data failed, trying legacy endpoint"),
    }
    self.registry_legacy(now).await
  }

  /// Page through the open-data feed until a short or empty page.
  async fn registry_open_data(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let cfg = &self.settings.sources.registry;
    let url = format!("{}{}", cfg.base_url.trim_end_matches('/'), cfg.fixtures_path);
    let window = self.settings.window();
    let today = london_today(now);
    let from = today
      .checked_sub_days(Days::new(window.results_days_back.into()))
      .unwrap_or(today);
    let to = today
      .checked_add_days(Days::new(window.days_forward.into()))
      .unwrap_or(today);

    let mut fixtures = Vec::new();
    for page in 1..=MAX_PAGES {
      let query = registry_query(from, to, page, cfg.page_size, &cfg.org_ids);
      let body = self.get_text(&url, &query, None).await?;
      let rows = registry::rows(&body)?;
      let count = rows.len();
      fixtures.extend(rows.iter().filter_map(|row| registry::map_item(row, now)));
      debug!(page, rows = count, "registry page");
      if count < cfg.page_size.max(1) {
        return Ok(fixtures);
      }
    }
    warn!(pages = MAX_PAGES, "registry page limit reached, results may be incomplete");
    Ok(fixtures)
  }

  /// `GET {legacy_base_url}/api/fixtures/jsonp` once per org, or once
  /// unfiltered when no orgs are configured.
  async fn registry_legacy(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let cfg = &self.settings.sources.registry;
    let url = format!("{}{LEGACY_PATH}", cfg.legacy_base_url.trim_end_matches('/'));
    let bearer = (!cfg.api_key.is_empty()).then_some(cfg.api_key.as_str());

    let mut results = Vec::new();
    for query in legacy_queries(&cfg.org_ids) {
      let endpoint = match query.first() {
        Some((_, org)) => format!("{url}?orgId={org}"),
        None => url.clone(),
      };
      let result = self.registry_legacy_org(&url, &query, bearer, now).await;
      results.push((endpoint, result));
    }
    merge(Source::Registry, results)
  }

  async fn registry_legacy_org(
    &self,
    url: &str,
    query: &[(&str, String)],
    bearer: Option<&str>,
    now: DateTime<Utc>,
  ) -> Result<Vec<Fixture>> {
    let body = self.get_text(url, query, bearer).await?;
    Ok(registry::decode_legacy(&body, now)?)
  }

  // ── Club platform ─────────────────────────────────────────────────────────

  pub async fn club(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let cfg = &self.settings.sources.club;
    if cfg.token.is_empty() {
      warn!("sources.club.token is not set, skipping club platform");
      return Ok(Vec::new());
    }
    let base = cfg.base_url.trim_end_matches('/');

    let mut results = Vec::with_capacity(cfg.orgs.len());
    for org in &cfg.orgs {
      let url = format!("{base}/orgs/{org}/fixtures");
      let result = self.club_org(&url, &cfg.token, now).await;
      results.push((url, result));
    }
    merge(Source::Club, results)
  }

  async fn club_org(&self, url: &str, token: &str, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let body = self.get_text(url, &[], Some(token)).await?;
    Ok(club::decode(&body, now)?)
  }

  // ── Calendar feeds ────────────────────────────────────────────────────────

  pub async fn calendar(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let mut results = Vec::new();
    for url in &self.settings.sources.calendar.urls {
      let result = self.calendar_feed(url, now).await;
      results.push((url.clone(), result));
    }
    merge(Source::Calendar, results)
  }

  async fn calendar_feed(&self, url: &str, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let body = self.get_text(url, &[], None).await?;
    let feed = CalendarFeed {
      url,
      source: Source::Calendar,
      adult_football_only: false,
    };
    Ok(calendar::decode(&body, &feed, now)?)
  }

  // ── Club sites ────────────────────────────────────────────────────────────

  /// Find a calendar export behind each configured page and decode it.
  pub async fn scraper(&self, now: DateTime<Utc>) -> Result<Vec<Fixture>> {
    let cfg = &self.settings.sources.scraper;
    let mut results = Vec::new();
    for page in &cfg.pages {
      let result = self.scrape_page(page, cfg.adult_football_only, now).await;
      results.push((page.clone(), result));
    }
    merge(Source::Scraper, results)
  }

  async fn scrape_page(
    &self,
    page: &str,
    adult_football_only: bool,
    now: DateTime<Utc>,
  ) -> Result<Vec<Fixture>> {
    let (url, body) = self.find_export(page).await?;
    let feed = CalendarFeed {
      url: &url,
      source: Source::Scraper,
      adult_football_only,
    };
    Ok(calendar::decode(&body, &feed, now)?)
  }

  async fn find_export(&self, page: &str) -> Result<(String, String)> {
    for candidate in export_candidates(page)? {
      match self.get_text(&candidate, &[], None).await {
        Ok(body) if body.contains(CALENDAR_MARKER) => {
          debug!(page, export = %candidate, "found calendar export");
          return Ok((candidate, body));
        }
        Ok(_) => debug!(export = %candidate, "not a calendar document"),
        Err(e) => debug!(export = %candidate, error = %format!("{e:#}"), "no export"),
      }
    }
    Err(anyhow!("no calendar export found for {page}"))
  }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn registry_query(
  from: NaiveDate,
  to: NaiveDate,
  page: u32,
  page_size: usize,
  org_ids: &[String],
) -> Vec<(&'static str, String)> {
  let mut query = vec![
    ("fromDate", from.format("%Y-%m-%d").to_string()),
    ("toDate", to.format("%Y-%m-%d").to_string()),
    ("page", page.to_string()),
    ("pageSize", page_size.to_string()),
  ];
  if !org_ids.is_empty() {
    query.push(("orgIds", org_ids.join(",")));
  }
  query
}

/// The legacy endpoint is tried when it is configured and the open-data feed
/// failed or returned nothing.
fn needs_legacy(open_data: &Result<Vec<Fixture>>, legacy_base_url: &str) -> bool {
  !legacy_base_url.is_empty() && !open_data.as_ref().is_ok_and(|f| !f.is_empty())
}

/// One query per org for the legacy endpoint; a single unfiltered query when
/// there are none.
fn legacy_queries(org_ids: &[String]) -> Vec<Vec<(&'static str, String)>> {
  if org_ids.is_empty() {
    return vec![Vec::new()];
  }
  org_ids.iter().map(|org| vec![("orgId", org.clone())]).collect()
}

/// Event-calendar export URLs to try for a club page, most specific last.
fn export_candidates(page: &str) -> Result<Vec<String>> {
  let parsed = Url::parse(page).with_context(|| format!("invalid page URL {page}"))?;
  let origin = parsed.origin().ascii_serialization();
  Ok(vec![
    format!("{origin}/events/list/?ical=1&tribe_display=all"),
    format!("{origin}/events/?ical=1&tribe_display=all"),
    format!("{}/?ical=1&tribe_display=all", page.trim_end_matches('/')),
  ])
}

/// Combine the per-endpoint results of one source. Failed endpoints are
/// logged and skipped; the source fails only when every endpoint failed.
fn merge(source: Source, results: Vec<(String, Result<Vec<Fixture>>)>) -> Result<Vec<Fixture>> {
  let attempted = results.len();
  let mut fixtures = Vec::new();
  let mut failures = Vec::new();

  for (endpoint, result) in results {
    match result {
      Ok(batch) => fixtures.extend(batch),
      Err(e) => {
        warn!(%source, %endpoint, error = %format!("{e:#}"), "endpoint failed");
        failures.push(format!("{endpoint}: {e:#}"));
      }
    }
  }

  if attempted > 0 && failures.len() == attempted {
    bail!("every {source} endpoint failed:\n{}", failures.join("\n"));
  }
  Ok(fixtures)
}

// ─── Command ──────────────────────────────────────────────────────────────────

/// Fetch all enabled sources and refresh the raw cache. Returns the combined
/// list in source order.
pub async fn fetch(settings: &Settings, cache: &RawCache) -> Result<Vec<Fixture>> {
  let now = Utc::now();
  let fetcher = Fetcher::new(settings)?;
  let mut combined = Vec::new();

  for (source, result) in fetcher.fetch_all(now).await {
    match result {
      Ok(fixtures) => {
        let fixtures = boundary::admit(fixtures);
        info!(%source, count = fixtures.len(), "fetched source");
        cache.write_raw(source, &fixtures)?;
        combined.extend(fixtures);
      }
      Err(e) => cache.write_error(source, &format!("{e:#}"))?,
    }
  }

  cache.write_combined(&combined)?;
  info!(total = combined.len(), path = %cache.combined_path().display(), "wrote combined cache");
  Ok(combined)
}
