//! `matchday` — fetch, reconcile and publish GAA fixtures.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `MATCHDAY_*` environment variables.
//!
//! ```text
//! matchday fetch      # pull every enabled source into the raw cache
//! matchday build      # reconcile the cached fixtures and publish
//! matchday all        # fetch, then build
//! matchday validate   # check the published artifacts
//! matchday weekend    # top competitions this weekend, as JSON
//! ```

mod fetch;
mod retry;
mod settings;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use matchday_core::{Engine, Fixture};
use matchday_publish::{ArtifactStore, RawCache, validate};
use settings::Settings;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "GAA fixtures reconciliation and publishing")]
struct Cli {
  /// Path to the configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
  /// Fetch every enabled source and write the raw cache.
  Fetch,
  /// Reconcile the cached fixtures and publish the artifacts.
  Build,
  /// Fetch, then build.
  All,
  /// Check the published artifacts; exits 1 on any violation.
  Validate,
  /// Print the weekend's top competitions as JSON.
  Weekend,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;
  let cache = RawCache::new(expand_tilde(&settings.cache_dir));
  let store = ArtifactStore::new(expand_tilde(&settings.output_dir), settings.preserve_on_empty);

  match cli.command {
    Command::Fetch => {
      fetch::fetch(&settings, &cache).await?;
    }
    Command::Build => {
      let fixtures = cached_or_fetch(&settings, &cache).await?;
      build(&settings, &store, &fixtures)?;
    }
    Command::All => {
      let fixtures = fetch::fetch(&settings, &cache).await?;
      build(&settings, &store, &fixtures)?;
    }
    Command::Validate => {
      let violations = validate(&store);
      if !violations.is_empty() {
        for violation in &violations {
          println!("{violation}");
        }
        return Ok(ExitCode::FAILURE);
      }
      println!("ok");
    }
    Command::Weekend => {
      let fixtures = cached_or_fetch(&settings, &cache).await?;
      let top = engine(&settings)?.weekend_top(&fixtures, Utc::now());
      println!("{}", serde_json::to_string_pretty(&top)?);
    }
  }

  Ok(ExitCode::SUCCESS)
}

fn engine(settings: &Settings) -> anyhow::Result<Engine> {
  let tables = settings.tables()?;
  tracing::info!(version = %tables.version, "loaded data tables");
  Ok(Engine::new(&tables, settings.priority()?))
}

/// The combined list from the last fetch, fetching first if there is none.
async fn cached_or_fetch(settings: &Settings, cache: &RawCache) -> anyhow::Result<Vec<Fixture>> {
  if let Some(fixtures) = cache.read_combined()? {
    tracing::info!(count = fixtures.len(), "using cached fixtures");
    return Ok(fixtures);
  }
  tracing::info!("no cached fixtures, fetching");
  fetch::fetch(settings, cache).await
}

fn build(settings: &Settings, store: &ArtifactStore, fixtures: &[Fixture]) -> anyhow::Result<()> {
  let publication = engine(settings)?.run(fixtures, Utc::now(), &settings.window());
  if publication.results_fell_back {
    tracing::info!("no results in the recent window, published the fallback set");
  }
  store
    .publish(&publication)
    .with_context(|| format!("failed to publish to {}", store.dir().display()))?;
  tracing::info!(
    upcoming = publication.upcoming.len(),
    recent = publication.recent.len(),
    competitions = publication.competitions.len(),
    "published"
  );
  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
