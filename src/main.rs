//! `lyricsync` - play a song and follow its lyrics word by word.

use anyhow::Context;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{io, panic, time::Duration};
use tracing_subscriber::EnvFilter;

use lyricsync::app::App;
use lyricsync::config::Config;
use lyricsync::ui;

// Helper function to ensure the terminal is cleaned up on exit
fn cleanup_terminal<B: Backend + std::io::Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn log_path() -> PathBuf {
    if let Ok(path) = std::env::var("LYRICSYNC_LOG") {
        return PathBuf::from(shellexpand::tilde(&path).to_string());
    }
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lyricsync")
        .join("lyricsync.log")
}

// The terminal owns stdout, so logs go to a file
fn init_logging() -> anyhow::Result<PathBuf> {
    let path = log_path();
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    let file = fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log = init_logging().context("failed to set up logging")?;
    let config = Config::load().context("invalid configuration")?;
    tracing::info!("Starting {} {} (log: {})", config.app_name(), config.app_version(), log.display());

    // Setup better panic handling that cleans up terminal first
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config);
    let res = run_app(&mut terminal, app).await;

    if let Err(e) = cleanup_terminal(&mut terminal) {
        eprintln!("Error cleaning up terminal: {e:?}");
    }

    if let Err(err) = res {
        tracing::error!("{err:?}");
        eprintln!("{err:?}");
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    loop {
        app.handle_updates(); // Tick first so the frame shows the current word

        terminal.draw(|f| ui::draw(f, &mut app))?;

        // Never wait past the next tick
        let wait = app.until_next_tick().min(Duration::from_millis(50));
        if event::poll(wait)? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        } else {
            // Let spawned sync jobs make progress
            tokio::task::yield_now().await;
        }

        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
