//! MapToPoster TUI Entry Point
//!
//! Launches the terminal UI for the map poster studio.
//!
//! Environment:
//!   MAPOSTER_CONFIG      Path to a maposter.toml (default: XDG config dir)
//!   MAPOSTER_LOG_FILE    Append tracing output to this file
//!   RUST_LOG             Tracing filter (default: off)

use std::fs::OpenOptions;
use std::io;
use std::panic;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use maposter_tui::App;
use studio_core::{load_config, load_config_from_path};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The alternate screen owns stdout, so tracing goes to a file or nowhere.
    if let Ok(path) = std::env::var("MAPOSTER_LOG_FILE") {
        let log_file = OpenOptions::new().create(true).append(true).open(&path)?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(log_file)
            .with_ansi(false)
            .init();
    }

    // Read config before touching the terminal; errors print normally.
    let config = match std::env::var("MAPOSTER_CONFIG") {
        Ok(path) => load_config_from_path(Some(path.into()))?,
        Err(_) => load_config()?,
    };

    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("Error: maposter requires a terminal (TTY)");
        std::process::exit(1);
    }

    // Restore the terminal even when a draw panics.
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(config);
    let result = app.run(&mut terminal).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The goodbye lands on the normal screen, after the session.
    if let Some(goodbye) = app.goodbye() {
        println!("\n{goodbye}\n");
    }

    result
}
