// main.rs

mod api;
mod app;
mod config;
mod download;
mod error;
mod format;
mod forms;
mod models;
mod session;
mod ui;

use crate::api::ApiClient;
use crate::app::App;
use crate::config::Config;
use crate::session::Session;
use crate::ui::run_app;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dotenv::dotenv;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

// The terminal belongs to the UI, so logs go to a file.
fn init_logging(log_file: &Path) -> io::Result<()> {
    if let Some(dir) = log_file.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::load()?;
    init_logging(&config.log_file)?;
    info!("using backend at {}", config.api_base_url);

    let client = ApiClient::new(&config.api_base_url, Session::new(&config.session_path));
    info!("session file {}", client.session().path().display());
    let signed_in = client.session().token().is_some();
    let app = App::new(
        client.session().user(),
        signed_in,
        config.download_dir.clone(),
    );

    // Setup terminal UI
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    terminal.hide_cursor()?;

    let res = run_app(&mut terminal, app, &client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
