use ratatui::backend::TestBackend;
use ratatui::Terminal;

use tickerboard::event::AppEvent;
use tickerboard::model::price::{PriceState, PriceTable};
use tickerboard::ui::{self, AppState};
use tickerboard::watchlist::MarketCatalog;

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let area = buf.area;
    let mut out = String::new();
    for y in 0..area.height {
        for x in 0..area.width {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn render_text(state: &AppState) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).expect("test terminal");
    terminal
        .draw(|frame| ui::render(frame, state))
        .expect("render should succeed");
    buffer_text(&terminal)
}

fn state_with(symbols: &[&str]) -> AppState {
    let mut state = AppState::new("demo", 5, MarketCatalog::default());
    state.apply(AppEvent::WatchlistChanged(
        symbols.iter().map(|s| s.to_string()).collect(),
    ));
    state
}

#[test]
/// Verifies the loading placeholder shows until the first watchlist arrives.
fn render_loading_before_watchlist() {
    let state = AppState::new("demo", 5, MarketCatalog::default());
    assert!(render_text(&state).contains("Loading watchlist..."));
}

#[test]
/// Verifies the empty-portfolio call to action.
fn render_empty_portfolio() {
    let state = state_with(&[]);
    let text = render_text(&state);
    assert!(text.contains("Start Building Your Portfolio"));
    assert!(text.contains("Add Asset (0/5)"));
}

#[test]
/// Verifies cards show price, signed change and percent at two decimals,
/// and that a watched ticker without data renders 0.00.
fn render_cards_with_prices() {
    let mut state = state_with(&["TSLA", "AAPL", "NFLX"]);
    let mut prices = PriceTable::new();
    prices.insert(
        "TSLA".to_string(),
        PriceState {
            price: 252.5,
            change: 2.5,
            percent_change: 1.0,
        },
    );
    prices.insert(
        "AAPL".to_string(),
        PriceState {
            price: 168.3,
            change: -1.7,
            percent_change: -1.0,
        },
    );
    state.apply(AppEvent::PricesUpdated(prices));

    let text = render_text(&state);
    assert!(text.contains("TSLA"));
    assert!(text.contains("$252.50"));
    assert!(text.contains("+2.50 1.00%"));
    assert!(text.contains("$168.30"));
    assert!(text.contains("-1.70 -1.00%"));
    assert!(text.contains("$0.00"));
    assert!(text.contains("Add Asset (3/5)"));
    assert!(text.contains("updates: 1"));
}

#[test]
/// Verifies the picker's empty-result messages.
fn render_picker_empty_results() {
    let mut state = state_with(&["TSLA"]);
    state.set_picker_open(true);
    state.picker_type('Z');
    state.picker_type('Z');
    assert!(render_text(&state).contains("No stocks found"));

    let all: Vec<&str> = tickerboard::watchlist::DEFAULT_MARKETS.to_vec();
    let mut full = AppState::new("demo", all.len(), MarketCatalog::default());
    full.apply(AppEvent::WatchlistChanged(
        all.iter().map(|s| s.to_string()).collect(),
    ));
    full.set_picker_open(true);
    let text = render_text(&full);
    assert!(text.contains("Available Markets"));
    assert!(text.contains("All available assets added"));
}

#[test]
/// Verifies picker navigation and search reset semantics.
fn picker_navigation_and_selection() {
    let mut state = state_with(&["GOOG"]);
    state.set_picker_open(true);
    assert_eq!(state.picker_selection().as_deref(), Some("TSLA"));
    state.picker_down();
    assert_eq!(state.picker_selection().as_deref(), Some("AMZN"));
    state.picker_up();
    state.picker_up();
    assert_eq!(state.picker_selection().as_deref(), Some("TSLA"));

    state.picker_type('n');
    state.picker_type('f');
    assert_eq!(state.picker_selection().as_deref(), Some("NFLX"));
    state.picker_backspace();
    assert_eq!(state.picker_query(), "n");

    state.set_picker_open(false);
    assert!(!state.is_picker_open());
    assert_eq!(state.picker_query(), "");
}

#[test]
/// Verifies card selection wraps and is clamped when the list shrinks.
fn selection_wraps_and_clamps() {
    let mut state = state_with(&["TSLA", "AAPL", "MSFT"]);
    state.select_prev();
    assert_eq!(state.selected_ticker(), Some("MSFT"));
    state.select_next();
    assert_eq!(state.selected_ticker(), Some("TSLA"));

    state.select_prev();
    state.apply(AppEvent::WatchlistChanged(vec!["TSLA".to_string()]));
    assert_eq!(state.selected_ticker(), Some("TSLA"));

    state.apply(AppEvent::Error("write failed".to_string()));
    assert_eq!(state.log_messages.last().map(String::as_str), Some("[ERR] write failed"));
}
