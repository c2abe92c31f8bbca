use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use tokio::sync::{mpsc, watch};

use tickerboard::config::Config;
use tickerboard::event::AppEvent;
use tickerboard::input::{
    is_interrupt, parse_main_command, parse_picker_command, PickerCommand, UiCommand,
};
use tickerboard::model::price::PriceTable;
use tickerboard::simulator::{ChaChaSource, SimulationEngine};
use tickerboard::ui::{self, AppState};
use tickerboard::watchlist_store::{run_listener, WatchlistListener, WatchlistStore};

/// Applies a new watchlist to the UI and hands the same set to the simulator.
fn sync_watchlist(app_state: &mut AppState, engine: &SimulationEngine, symbols: Vec<String>) {
    app_state.apply(AppEvent::WatchlistChanged(symbols));
    engine.set_subscriptions(app_state.watchlist.symbols());
}

fn handle_add_stock(
    ticker: &str,
    app_state: &mut AppState,
    engine: &SimulationEngine,
    store: &WatchlistStore,
    user: &str,
) {
    let mut candidate = app_state.watchlist.clone();
    let symbol = match candidate.add(ticker) {
        Ok(symbol) => symbol,
        Err(e) => {
            app_state.push_log(format!("[WARN] {}", e));
            return;
        }
    };
    match store.add(user, &symbol) {
        Ok(stored) => {
            sync_watchlist(app_state, engine, stored);
            app_state.set_picker_open(false);
            app_state.push_log(format!("Added {}", symbol));
            tracing::info!(user, symbol = %symbol, "watchlist add");
        }
        Err(e) => {
            tracing::error!(user, symbol = %symbol, error = %e, "Failed to add stock");
            app_state.apply(AppEvent::Error(format!(
                "Failed to add stock. Please check permissions. ({})",
                e
            )));
        }
    }
}

fn handle_remove_selected(
    app_state: &mut AppState,
    engine: &SimulationEngine,
    store: &WatchlistStore,
    user: &str,
) {
    let Some(symbol) = app_state.selected_ticker().map(str::to_string) else {
        return;
    };
    match store.remove(user, &symbol) {
        Ok(stored) => {
            sync_watchlist(app_state, engine, stored);
            app_state.push_log(format!("Removed {}", symbol));
            tracing::info!(user, symbol = %symbol, "watchlist remove");
        }
        Err(e) => {
            tracing::error!(user, symbol = %symbol, error = %e, "Failed to remove stock");
            app_state.apply(AppEvent::Error(format!("Failed to remove stock ({})", e)));
        }
    }
}

/// Handles one key press. Returns true when the user asked to quit.
fn handle_key(
    key: &KeyEvent,
    app_state: &mut AppState,
    engine: &SimulationEngine,
    store: &WatchlistStore,
    user: &str,
) -> bool {
    if is_interrupt(key) {
        tracing::info!("Ctrl+C pressed");
        return true;
    }
    if app_state.is_picker_open() {
        if let Some(cmd) = parse_picker_command(&key.code) {
            match cmd {
                PickerCommand::Up => app_state.picker_up(),
                PickerCommand::Down => app_state.picker_down(),
                PickerCommand::Backspace => app_state.picker_backspace(),
                PickerCommand::Type(c) => app_state.picker_type(c),
                PickerCommand::Close => app_state.set_picker_open(false),
                PickerCommand::Confirm => {
                    if let Some(ticker) = app_state.picker_selection() {
                        handle_add_stock(&ticker, app_state, engine, store, user);
                    }
                }
            }
        }
        return false;
    }
    match parse_main_command(&key.code) {
        Some(UiCommand::Quit) => {
            tracing::info!("User quit");
            return true;
        }
        Some(UiCommand::OpenPicker) => {
            if app_state.watchlist.is_full() {
                app_state.push_log(format!(
                    "[WARN] Portfolio limit reached (Max {}).",
                    app_state.watchlist.capacity()
                ));
            } else {
                app_state.set_picker_open(true);
            }
        }
        Some(UiCommand::RemoveSelected) => {
            handle_remove_selected(app_state, engine, store, user);
        }
        Some(UiCommand::SelectPrev) => app_state.select_prev(),
        Some(UiCommand::SelectNext) => app_state.select_next(),
        None => {}
    }
    false
}

async fn forward_prices(
    mut prices_rx: watch::Receiver<PriceTable>,
    app_tx: mpsc::Sender<AppEvent>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = prices_rx.changed() => {
                if changed.is_err() {
                    tracing::debug!("Price feed closed, forwarder exiting");
                    break;
                }
                let prices = prices_rx.borrow_and_update().clone();
                if app_tx.try_send(AppEvent::PricesUpdated(prices)).is_err() {
                    tracing::warn!("UI channel full, dropping price update");
                }
            }
            _ = shutdown.changed() => {
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure config/default.toml exists and is valid");
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with TUI
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("failed to create {}", config.logging.file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let user = config.session.user.clone();
    tracing::info!(
        user = %user,
        store = %config.watchlist.store_path.display(),
        tick_interval = %config.simulator.tick_interval,
        "Starting tickerboard"
    );

    let settings = config
        .simulator
        .settings()
        .context("validated simulator config became invalid at runtime")?;
    let poll_interval = config
        .watchlist
        .poll_interval()
        .context("validated watchlist config became invalid at runtime")?;
    let engine = match config.simulator.seed {
        Some(seed) => SimulationEngine::with_random(settings, Box::new(ChaChaSource::seeded(seed))),
        None => SimulationEngine::new(settings),
    };

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(256);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut app_state = AppState::new(
        &user,
        config.watchlist.capacity,
        config.watchlist.catalog(),
    );

    let store = WatchlistStore::open(&config.watchlist.store_path);
    if let Err(e) = store.ensure_user(&user) {
        tracing::error!(error = %e, "Error checking user document");
        app_state.apply(AppEvent::Error(format!("Error checking user document: {}", e)));
    }
    let initial_doc = match store.load(&user) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load watchlist, starting empty");
            app_state.apply(AppEvent::Error(format!("Failed to load watchlist: {}", e)));
            None
        }
    };
    let initial_watchlist = initial_doc
        .as_ref()
        .map(|doc| doc.watchlist.clone())
        .unwrap_or_default();

    tokio::spawn(forward_prices(
        engine.subscribe(),
        app_tx.clone(),
        shutdown_rx.clone(),
    ));

    // Picks up changes written by other sessions sharing the store
    tokio::spawn(run_listener(
        WatchlistListener::new(store.clone(), &user, initial_doc),
        poll_interval,
        app_tx.clone(),
        shutdown_rx.clone(),
    ));

    // Ctrl+C handler
    let ctrl_c_shutdown = shutdown_tx.clone();
    let ctrl_c_tx = app_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_tx
            .send(AppEvent::LogMessage("Ctrl+C received, shutting down".to_string()))
            .await;
        let _ = ctrl_c_shutdown.send(true);
    });

    sync_watchlist(&mut app_state, &engine, initial_watchlist);
    app_state.push_log(format!(
        "tickerboard started | {} | {} watched",
        user,
        app_state.watchlist.len()
    ));

    let mut terminal = ratatui::init();
    loop {
        terminal.draw(|frame| ui::render(frame, &app_state))?;

        // Handle input (non-blocking with timeout)
        if crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms))? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key(&key, &mut app_state, &engine, &store, &user)
                {
                    let _ = shutdown_tx.send(true);
                }
            }
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            match evt {
                AppEvent::WatchlistChanged(symbols) => {
                    sync_watchlist(&mut app_state, &engine, symbols);
                }
                other => app_state.apply(other),
            }
        }

        if *shutdown_rx.borrow() {
            break;
        }
    }

    engine.stop();
    ratatui::restore();
    tracing::info!(ticks = engine.tick_count(), "Shutdown complete");
    println!("Goodbye! Check {} for details.", config.logging.file.display());
    Ok(())
}
