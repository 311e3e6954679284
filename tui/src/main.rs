//! Dopogoto Entry Point
//!
//! Launches the terminal player: ASCII video backdrop, streamed music and
//! a shared chat room on one screen.
//!
//! Usage:
//!   dopogoto [--help | --version]
//!
//! Settings come from the environment (`DOPOGOTO_CLIPS`,
//! `DOPOGOTO_NO_UPDATE_CHECK`, `DOPOGOTO_LOG_FILE`, `DOPOGOTO_CHAT_*`,
//! `RUST_LOG`).

use std::fs::{self, File};
use std::io::{self, IsTerminal};
use std::panic;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use dopogoto_core::{AppConfig, AudioOutput};
use dopogoto_tui::App;

const DEFAULT_FILTER: &str = "dopogoto=info,dopogoto_core=info,warn";

/// Dopogoto - music, ASCII video and chat in your terminal
#[derive(Parser, Debug)]
#[command(name = "dopogoto")]
#[command(author, version, about, long_about = None)]
struct Args {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _args = Args::parse();
    let config = AppConfig::from_env();

    // The UI owns the terminal, so logs only ever go to a file
    if let Some(path) = config.log_file.as_deref() {
        init_logging(path);
    }

    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        eprintln!("dopogoto needs an interactive terminal (TTY)");
        std::process::exit(1);
    }

    // Audio first: without a device the player still runs and skips tracks
    let output = match AudioOutput::open() {
        Ok(output) => Some(output),
        Err(e) => {
            warn!(error = %e, "no audio output");
            None
        }
    };

    // Set up panic hook to restore terminal
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

    let result = run_app(&mut terminal, &config, output.as_ref()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &AppConfig,
    output: Option<&AudioOutput>,
) -> anyhow::Result<()> {
    let mut app = App::new(config, output)?;
    app.run(terminal).await?;
    info!("bye");
    Ok(())
}

/// File logging; a file that cannot be opened leaves logging off.
fn init_logging(path: &Path) {
    if let Some(dir) = path.parent() {
        if fs::create_dir_all(dir).is_err() {
            return;
        }
    }
    let Ok(file) = File::options().create(true).append(true).open(path) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(filter)
        .try_init();
}
