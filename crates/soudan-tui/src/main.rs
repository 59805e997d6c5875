use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use soudan_core::{ChatClient, ChatController, Config, Session};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, TICK_RATE};

#[derive(Parser)]
#[command(name = "soudan")]
#[command(about = "Terminal chat for the consultation room", version)]
struct Cli {
    /// Chat endpoint URL (overrides SOUDAN_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Config file to read instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the log (the terminal is busy drawing the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => default_log_path()?,
    };
    init_logging(&log_path)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    let client = ChatClient::new(&endpoint);
    tracing::info!(endpoint = %client.endpoint(), log = %log_path.display(), "starting soudan");

    let controller = ChatController::new(
        Session::with_greeting(config.greeting()),
        Arc::new(client),
    );
    let mut app = App::new(config.title(), controller);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    tracing::info!(turns = app.session().history().len(), "exiting");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir().context("Could not determine cache directory")?;
    Ok(cache_dir.join("soudan").join("soudan.log"))
}

/// Log to a file; `RUST_LOG` overrides the default filter.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("soudan_core=info,soudan=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "soudan",
            "--endpoint",
            "http://127.0.0.1:9000/api/chat",
            "--log-file",
            "/tmp/soudan.log",
        ]);
        assert_eq!(cli.endpoint.as_deref(), Some("http://127.0.0.1:9000/api/chat"));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/soudan.log")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["soudan"]);
        assert!(cli.endpoint.is_none());
        assert!(cli.log_file.is_none());
    }
}
