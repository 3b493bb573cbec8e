use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use liars_dice::game::GameConfig;
use liars_dice::tui::{app::AppState, controller};
use ratatui::prelude::*;
use std::fs::File;
use std::io::{self, IsTerminal, Stdout};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{info, warn};

const LOG_ENV: &str = "LIARS_DICE_LOG";
const SEED_ENV: &str = "LIARS_DICE_SEED";

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::event::DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file when one is named.
fn setup_logging() -> io::Result<()> {
    let Ok(path) = std::env::var(LOG_ENV) else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn config_from_env() -> GameConfig {
    let mut config = GameConfig::default();
    if let Ok(raw) = std::env::var(SEED_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(seed) => config.seed = Some(seed),
            Err(_) => warn!(value = %raw, "ignoring unparsable {SEED_ENV}"),
        }
    }
    config
}

fn main() -> io::Result<()> {
    if !io::stdout().is_terminal() {
        println!(
            "liars-dice TUI requires a real terminal (TTY).\nRun in Terminal and press q to quit. Version: {}",
            liars_dice::VERSION
        );
        return Ok(());
    }
    setup_logging()?;
    let config = config_from_env();
    let mut app = AppState::new(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    info!(version = liars_dice::VERSION, seed = app.game.seed(), "starting");

    let mut terminal = setup_terminal()?;
    let tick_rate = Duration::from_millis(250);
    let res = controller::run(&mut terminal, &mut app, tick_rate);

    // Always attempt to restore terminal
    restore_terminal(terminal)?;
    res
}
