//! Runtime settings, layered from an optional config file and `MATCHDAY_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use matchday_core::{SourcePriority, Tables, WindowConfig};
use serde::Deserialize;

// ─── Settings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub days_forward:          u32,
  pub days_back:             u32,
  /// Falls back to `days_back`.
  pub results_days_back:     Option<u32>,
  /// Falls back to `days_forward`.
  pub scraper_days_forward:  Option<u32>,
  pub results_fallback_days: u32,
  pub preserve_on_empty:     bool,
  pub output_dir:            PathBuf,
  pub cache_dir:             PathBuf,
  pub tables_path:           Option<PathBuf>,
  /// Highest trust first.
  pub source_priority:       Vec<String>,
  pub sources:               Sources,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      days_forward:          14,
      days_back:             7,
      results_days_back:     None,
      scraper_days_forward:  None,
      results_fallback_days: 365,
      preserve_on_empty:     true,
      output_dir:            PathBuf::from("public/data"),
      cache_dir:             PathBuf::from(".cache"),
      tables_path:           None,
      source_priority:       ["gaa_gms", "clubzap", "ics", "scraper"]
        .map(String::from)
        .to_vec(),
      sources:               Sources::default(),
    }
  }
}

impl Settings {
  /// Read `path` (if it exists) and overlay the environment.
  pub fn load(path: &Path) -> Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("MATCHDAY")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialize config")
  }

  pub fn window(&self) -> WindowConfig {
    WindowConfig {
      days_forward:          self.days_forward,
      results_days_back:     self.results_days_back.unwrap_or(self.days_back),
      scraper_days_forward:  self.scraper_days_forward.unwrap_or(self.days_forward),
      results_fallback_days: self.results_fallback_days,
    }
  }

  pub fn priority(&self) -> Result<SourcePriority> {
    SourcePriority::from_names(&self.source_priority).context("invalid source_priority")
  }

  /// The data tables: `tables_path` when set, else the built-in document.
  pub fn tables(&self) -> Result<Tables> {
    let Some(path) = &self.tables_path else {
      return Tables::builtin().context("built-in data tables are invalid");
    };
    let text = std::fs::read_to_string(path)
      .with_context(|| format!("reading data tables {}", path.display()))?;
    Tables::from_toml(&text).with_context(|| format!("parsing data tables {}", path.display()))
  }
}

// ─── Sources ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sources {
  pub registry: RegistrySettings,
  pub club:     ClubSettings,
  pub calendar: CalendarSettings,
  pub scraper:  ScraperSettings,
}

/// Paged JSON registry of official fixtures and results.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
  pub enabled:         bool,
  /// Open-data feed.
  pub base_url:        String,
  pub fixtures_path:   String,
  pub org_ids:         Vec<String>,
  pub page_size:       usize,
  /// Older JSONP endpoint, queried once per org when the open-data feed
  /// yields nothing.
  pub legacy_base_url: String,
  /// Bearer token for the legacy endpoint. Sent only when non-empty.
  pub api_key:         String,
}

impl Default for RegistrySettings {
  fn default() -> Self {
    Self {
      enabled:         false,
      base_url:        String::new(),
      fixtures_path:   "/fixtures".to_string(),
      org_ids:         Vec::new(),
      page_size:       100,
      legacy_base_url: String::new(),
      api_key:         String::new(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClubSettings {
  pub enabled:  bool,
  pub base_url: String,
  /// Bearer token. The source is skipped without one.
  pub token:    String,
  pub orgs:     Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
  pub enabled: bool,
  pub urls:    Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
  pub enabled:             bool,
  pub pages:               Vec<String>,
  pub adult_football_only: bool,
}

impl Default for ScraperSettings {
  fn default() -> Self {
    Self {
      enabled:             false,
      pages:               Vec::new(),
      adult_football_only: true,
    }
  }
}
