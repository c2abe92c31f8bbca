pub mod dashboard;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use crate::event::AppEvent;
use crate::model::price::PriceTable;
use crate::watchlist::{MarketCatalog, Watchlist};

use dashboard::{EmptyPortfolio, KeybindBar, LogPanel, MarketPicker, StatusBar, StockCard};

const MAX_LOG_MESSAGES: usize = 200;
const CARD_COLUMNS: usize = 3;
const CARD_HEIGHT: u16 = 6;

pub struct AppState {
    pub user: String,
    pub watchlist: Watchlist,
    pub catalog: MarketCatalog,
    pub prices: PriceTable,
    pub price_updates: u64,
    pub loading: bool,
    pub selected: usize,
    pub log_messages: Vec<String>,
    picker_open: bool,
    picker_query: String,
    picker_index: usize,
}

impl AppState {
    pub fn new(user: &str, capacity: usize, catalog: MarketCatalog) -> Self {
        Self {
            user: user.to_string(),
            watchlist: Watchlist::new(capacity),
            catalog,
            prices: PriceTable::new(),
            price_updates: 0,
            loading: true,
            selected: 0,
            log_messages: Vec::new(),
            picker_open: false,
            picker_query: String::new(),
            picker_index: 0,
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn selected_ticker(&self) -> Option<&str> {
        self.watchlist
            .symbols()
            .get(self.selected)
            .map(String::as_str)
    }

    pub fn select_next(&mut self) {
        let len = self.watchlist.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.watchlist.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn is_picker_open(&self) -> bool {
        self.picker_open
    }

    pub fn picker_query(&self) -> &str {
        &self.picker_query
    }

    /// Opening or closing the picker always resets its search.
    pub fn set_picker_open(&mut self, open: bool) {
        self.picker_open = open;
        self.picker_query.clear();
        self.picker_index = 0;
    }

    pub fn picker_items(&self) -> Vec<String> {
        self.catalog.search(&self.watchlist, &self.picker_query)
    }

    pub fn picker_selection(&self) -> Option<String> {
        self.picker_items().get(self.picker_index).cloned()
    }

    pub fn picker_up(&mut self) {
        self.picker_index = self.picker_index.saturating_sub(1);
    }

    pub fn picker_down(&mut self) {
        let max = self.picker_items().len().saturating_sub(1);
        self.picker_index = (self.picker_index + 1).min(max);
    }

    pub fn picker_type(&mut self, c: char) {
        self.picker_query.push(c);
        self.picker_index = 0;
    }

    pub fn picker_backspace(&mut self) {
        self.picker_query.pop();
        self.picker_index = 0;
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::PricesUpdated(prices) => {
                self.prices = prices;
                self.price_updates += 1;
            }
            AppEvent::WatchlistChanged(symbols) => {
                self.watchlist = Watchlist::from_symbols(&symbols, self.watchlist.capacity());
                self.selected = self.selected.min(self.watchlist.len().saturating_sub(1));
                self.loading = false;
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(CARD_HEIGHT),
            Constraint::Length(6), // system log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    frame.render_widget(
        StatusBar {
            user: &state.user,
            watched: state.watchlist.len(),
            capacity: state.watchlist.capacity(),
            updates: state.price_updates,
            clock: &clock,
        },
        outer[0],
    );

    if state.loading {
        frame.render_widget(
            ratatui::widgets::Paragraph::new("Loading watchlist..."),
            outer[1],
        );
    } else if state.watchlist.is_empty() {
        frame.render_widget(
            EmptyPortfolio {
                capacity: state.watchlist.capacity(),
            },
            outer[1],
        );
    } else {
        render_cards(frame, state, outer[1]);
    }

    frame.render_widget(LogPanel::new(&state.log_messages), outer[2]);
    frame.render_widget(
        KeybindBar {
            picker_open: state.picker_open,
        },
        outer[3],
    );

    if state.picker_open {
        let items = state.picker_items();
        let height = (items.len() as u16 + 5).min(outer[1].height.max(5));
        let area = centered_rect(32, height, frame.area());
        frame.render_widget(
            MarketPicker::new(&items, &state.picker_query, state.picker_index),
            area,
        );
    }
}

fn render_cards(frame: &mut Frame, state: &AppState, area: Rect) {
    let symbols = state.watchlist.symbols();
    let rows = symbols.len().div_ceil(CARD_COLUMNS);
    let mut row_constraints = vec![Constraint::Length(CARD_HEIGHT); rows];
    row_constraints.push(Constraint::Min(0));
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(area);

    for (row, chunk) in symbols.chunks(CARD_COLUMNS).enumerate() {
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, CARD_COLUMNS as u32); CARD_COLUMNS])
            .split(row_areas[row]);
        for (col, ticker) in chunk.iter().enumerate() {
            let index = row * CARD_COLUMNS + col;
            frame.render_widget(
                StockCard::new(ticker, state.prices.get(ticker)).selected(index == state.selected),
                col_areas[col],
            );
        }
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
