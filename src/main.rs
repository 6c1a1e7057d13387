use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use feedgrid::app::{App, AppEvent};
use feedgrid::config::Config;
use feedgrid::feed::{FixtureOptions, FixtureService};
use feedgrid::preferences::{Preferences, ViewMode};
use feedgrid::ui;

/// Get the config directory path (~/.config/feedgrid/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("feedgrid"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedgrid",
    about = "Terminal social feed reader with a masonry grid"
)]
struct Args {
    /// JSON fixture with posts, notifications, and the unread count
    #[arg(long, value_name = "FILE")]
    fixture: PathBuf,

    /// Config file (defaults to ~/.config/feedgrid/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Grid columns for this session; also persisted when cycled
    #[arg(long, value_enum)]
    view_mode: Option<ViewMode>,

    /// Write logs here. Without it logs are discarded.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // The TUI owns stdout/stderr
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::sink)
            .init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file.as_ref())?;

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!(path = %config_dir.display(), error = %e, "Failed to create config directory");
        }
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let prefs_path = config_dir.join("state.json");
    let view_mode = args
        .view_mode
        .or(config.view_mode)
        .unwrap_or_else(|| Preferences::load(&prefs_path).view_mode);
    tracing::info!(%view_mode, "Starting");

    let backend = FixtureService::load(
        &args.fixture,
        FixtureOptions {
            page_size: config.page_size,
            latency: Duration::from_millis(config.latency_ms),
        },
    )
    .with_context(|| format!("Failed to load fixture '{}'", args.fixture.display()))?;

    let mut app = App::new(Arc::new(backend), &config, view_mode, Some(prefs_path));
    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(warning, "Ignoring keybinding override");
        eprintln!("Warning: {warning}");
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    ui::run(&mut app, event_tx, event_rx).await?;

    Ok(())
}
