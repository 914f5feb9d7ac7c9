//! `catchin`: terminal client for finding someone nearby to have a coffee
//! with.
//!
//! # Usage
//!
//! ```text
//! catchin --duration 45
//! catchin --locator fixed --lat 48.8566 --lng 2.3522
//! catchin --config ~/.config/catchin/config.toml --log-file /tmp/catchin.log
//! ```

mod app;
mod locator;
mod ui;

use std::{
  fs::File,
  io,
  path::PathBuf,
  sync::Mutex,
  time::{Duration, Instant},
};

use anyhow::{Context, Result};
use app::App;
use catchin_core::{config::SessionConfig, geo::Coordinate, session::Session};
use clap::Parser;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use locator::{Locator, LocatorConfig, LocatorKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "catchin", about = "Find someone nearby for a coffee")]
struct Args {
  /// Path to a TOML config file (`[session]` and `[locator]` tables).
  #[arg(short, long, value_name = "FILE", env = "CATCHIN_CONFIG")]
  config: Option<PathBuf>,

  /// How to find your position (default: ip).
  #[arg(long, value_enum, env = "CATCHIN_LOCATOR")]
  locator: Option<LocatorKind>,

  /// Latitude for the fixed locator.
  #[arg(long, env = "CATCHIN_LAT", allow_hyphen_values = true)]
  lat: Option<f64>,

  /// Longitude for the fixed locator.
  #[arg(long, env = "CATCHIN_LNG", allow_hyphen_values = true)]
  lng: Option<f64>,

  /// IP geolocation endpoint.
  #[arg(long, env = "CATCHIN_IP_URL")]
  ip_url: Option<String>,

  /// Minutes of availability (15, 30, 45, 60 or 120).
  #[arg(short, long, env = "CATCHIN_DURATION")]
  duration: Option<u32>,

  /// Seconds per countdown minute; lower it for demos.
  #[arg(long, env = "CATCHIN_TICK_SECONDS")]
  tick_seconds: Option<u64>,

  /// Write logs here. The terminal is taken by the UI, so nothing is logged
  /// without it.
  #[arg(long, value_name = "FILE", env = "CATCHIN_LOG_FILE")]
  log_file: Option<PathBuf>,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  session: SessionConfig,
  #[serde(default)]
  locator: LocatorConfig,
}

impl ConfigFile {
  /// CLI flags override config file, which overrides defaults.
  fn apply(mut self, args: &Args) -> Result<Self> {
    if let Some(minutes) = args.duration {
      self.session.availability_minutes = minutes;
    }
    if let Some(secs) = args.tick_seconds {
      self.session.tick_seconds = secs;
    }
    if let Some(kind) = args.locator {
      self.locator.kind = kind;
    }
    if let Some(url) = &args.ip_url {
      self.locator.url = url.clone();
    }
    match (args.lat, args.lng) {
      (Some(lat), Some(lng)) => {
        self.locator.position =
          Some(Coordinate::new(lat, lng).context("invalid --lat/--lng")?);
        // A bare position implies the fixed locator.
        if args.locator.is_none() {
          self.locator.kind = LocatorKind::Fixed;
        }
      }
      (None, None) => {}
      _ => anyhow::bail!("--lat and --lng must be given together"),
    }
    Ok(self)
  }
}

fn init_logging(path: &std::path::Path) -> Result<()> {
  let file = File::create(path)
    .with_context(|| format!("creating log file {}", path.display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(Mutex::new(file))
    .init();
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(path) = &args.log_file {
    init_logging(path)?;
  }

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };
  let cfg = file_cfg.apply(&args)?;

  let session = Session::new(cfg.session).context("invalid session config")?;
  let locator = Locator::from_config(&cfg.locator)?;
  tracing::info!(locator = ?cfg.locator.kind, "starting");

  let mut app = App::new(session, locator);
  app.start();

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Run the event loop; restore terminal even on error.
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    let area = terminal
      .draw(|f| ui::draw(f, app))
      .context("drawing frame")?
      .area;
    app.on_frame(area);

    // Poll for an event, yielding control to tokio while waiting. Never
    // sleep past the next countdown tick.
    let wait = app
      .until_tick(Instant::now())
      .min(Duration::from_millis(50));
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(wait)? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key) {
          break;
        }
      }
      Some(Event::Resize(_, _)) => {
        // Terminal will redraw on next iteration.
      }
      _ => {}
    }

    app.pump();
    app.check_tick(Instant::now());
  }

  Ok(())
}
