//! Vaxmap - a terminal browser for COVID-19 vaccination centers.
//!
//! On start the app shows a splash screen with a progress gauge while the
//! local center cache is refreshed from the public center API, then lists
//! the cached centers with their marker colors and details.

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vaxmap_core::{Config, DisplayedCenters, RefreshOptions};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "vaxmap.log";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily rolling file in the
/// cache directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(config: &Config) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = config.cache_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let _log_guard = init_tracing(&config)?;

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if let Some(command) = args.get(1) {
        return run_command(command, config).await;
    }

    info!("Vaxmap starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match App::new(config) {
        Ok(mut app) => {
            app.start_splash();
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Vaxmap shutting down");
    Ok(())
}

/// Non-interactive commands for inspecting and maintaining the cache
async fn run_command(command: &str, config: Config) -> Result<()> {
    let orchestrator = app::open_orchestrator(&config, DisplayedCenters::new())?;

    match command {
        "--count" => {
            println!("{}", orchestrator.count());
        }
        "--dump" => {
            let snapshot = orchestrator.dump();
            println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
        }
        "--clear" => {
            orchestrator.clear()?;
            eprintln!("Center cache cleared");
        }
        "--refresh" | "--refresh-slow" => {
            let options = RefreshOptions {
                skip_remote_fetch: false,
                slow_mode: command == "--refresh-slow" || config.slow_mode,
            };
            let mut progress = orchestrator.refresh(options)?;
            let mut last_percent = None;
            while let Some(state) = progress.next().await {
                let percent = (state.progress * 10.0).floor() as u32 * 10;
                if last_percent != Some(percent) {
                    eprintln!("{:>3}%", percent);
                    last_percent = Some(percent);
                }
            }
            println!("{}", orchestrator.count());
        }
        other => {
            anyhow::bail!(
                "Unknown command: {}\nUsage: vaxmap [--count | --dump | --clear | --refresh | --refresh-slow]",
                other
            );
        }
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Pick up progress from the background refresh
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
