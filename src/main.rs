mod audio;
mod config;
mod controller;
mod errors;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::RodioDevice;
use config::AppConfig;
use controller::AppController;
use model::{AppModel, CatalogClient, JsonFileStore};

type App = AppController<CatalogClient, JsonFileStore, RodioDevice>;

#[tokio::main]
async fn main() -> Result<()> {
    let _log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== Music Finder Starting ===");

    let config = AppConfig::from_env()?;
    tracing::info!(
        search_url = %config.search_url,
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let search = CatalogClient::new(&config)?;
    let store = JsonFileStore::open(config.store_path());
    tracing::info!(path = %store.path().display(), "Favourites store opened");
    let device = RodioDevice::new(config.http_timeout);
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    let initial_query = config.initial_query.clone().unwrap_or_default();
    let app_model = AppModel::new(search, store, device, event_tx, initial_query.clone());
    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone());

    let _listener = controller.start_player_event_listener(event_rx);

    if !initial_query.trim().is_empty() {
        controller.spawn_search(initial_query);
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    model.lock().await.shutdown();

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Music Finder shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &App,
) -> io::Result<()> {
    loop {
        let (state, should_quit) = {
            let mut model = controller.model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model.auto_clear_old_errors();

            (model.snapshot(), model.should_quit())
        };

        terminal.draw(|f| {
            AppView::render(f, &state);
        })?;

        if should_quit {
            break;
        }

        // Short poll keeps search results and clip ends appearing promptly
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }
    }

    Ok(())
}
