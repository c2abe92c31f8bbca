use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

use crate::model::price::PriceState;

/// Percent move above which a card gets the sparkle marker.
pub const SPARKLE_PERCENT: f64 = 5.0;

pub fn format_price(data: Option<&PriceState>) -> String {
    match data {
        Some(state) => format!("{:.2}", state.price),
        None => "0.00".to_string(),
    }
}

pub fn format_change(data: Option<&PriceState>) -> String {
    match data {
        Some(state) if state.change > 0.0 => format!("+{:.2}", state.change),
        Some(state) => format!("{:.2}", state.change),
        None => "--".to_string(),
    }
}

pub fn format_percent(data: Option<&PriceState>) -> String {
    match data {
        Some(state) => format!("{:.2}%", state.percent_change),
        None => "--%".to_string(),
    }
}

pub struct StockCard<'a> {
    ticker: &'a str,
    data: Option<&'a PriceState>,
    selected: bool,
}

impl<'a> StockCard<'a> {
    pub fn new(ticker: &'a str, data: Option<&'a PriceState>) -> Self {
        Self {
            ticker,
            data,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl Widget for StockCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Missing data renders like an unchanged quote.
        let is_up = self.data.map(|d| d.is_up()).unwrap_or(true);
        let trend_color = if is_up { Color::Green } else { Color::Red };
        let arrow = if is_up { "▲" } else { "▼" };
        let sparkle = self
            .data
            .is_some_and(|d| d.percent_change > SPARKLE_PERCENT);

        let mut title = vec![
            Span::styled(
                self.ticker,
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(arrow, Style::default().fg(trend_color)),
        ];
        if sparkle {
            title.push(Span::styled(" *", Style::default().fg(Color::Yellow)));
        }

        let lines = vec![
            Line::from(title),
            Line::from(Span::styled(
                "Simulated Market Data",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(vec![
                Span::styled("$", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format_price(self.data),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Change ", Style::default().fg(Color::DarkGray)),
                Span::styled(format_change(self.data), Style::default().fg(trend_color)),
                Span::raw(" "),
                Span::styled(
                    format_percent(self.data),
                    Style::default().fg(trend_color),
                ),
            ]),
        ];

        let border_color = if self.selected {
            Color::Cyan
        } else {
            trend_color
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub user: &'a str,
    pub watched: usize,
    pub capacity: usize,
    pub updates: u64,
    pub clock: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let add_style = if self.watched >= self.capacity {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let line = Line::from(vec![
            Span::styled(
                " tickerboard ",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.user, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled("Live", Style::default().fg(Color::Green)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("Add Asset ({}/{})", self.watched, self.capacity),
                add_style,
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("updates: {}", self.updates),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.clock, Style::default().fg(Color::DarkGray)),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct EmptyPortfolio {
    pub capacity: usize,
}

impl Widget for EmptyPortfolio {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "Start Building Your Portfolio",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "Select up to {} stocks to track on your dashboard. Press [A] to browse.",
                    self.capacity
                ),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}

pub struct MarketPicker<'a> {
    items: &'a [String],
    query: &'a str,
    selected: usize,
}

impl<'a> MarketPicker<'a> {
    pub fn new(items: &'a [String], query: &'a str, selected: usize) -> Self {
        Self {
            items,
            query,
            selected,
        }
    }
}

impl Widget for MarketPicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let mut lines = vec![
            Line::from(vec![
                Span::styled("Search: ", Style::default().fg(Color::DarkGray)),
                Span::styled(self.query, Style::default().fg(Color::White)),
                Span::styled("_", Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
        ];
        if self.items.is_empty() {
            let empty = if self.query.is_empty() {
                "All available assets added"
            } else {
                "No stocks found"
            };
            lines.push(Line::from(Span::styled(
                empty,
                Style::default().fg(Color::DarkGray),
            )));
        } else {
            for (i, ticker) in self.items.iter().enumerate() {
                let style = if i == self.selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                lines.push(Line::from(Span::styled(format!(" {} ", ticker), style)));
            }
        }

        let block = Block::default()
            .title(" Available Markets ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::DarkGray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .title(" System Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct KeybindBar {
    pub picker_open: bool,
}

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(Color::Yellow);
        let text = Style::default().fg(Color::DarkGray);
        let line = if self.picker_open {
            Line::from(vec![
                Span::styled(" [Enter]", key),
                Span::styled(" add  ", text),
                Span::styled("[Up/Down]", key),
                Span::styled(" move  ", text),
                Span::styled("[Esc]", key),
                Span::styled(" close  ", text),
                Span::styled("type to search", text),
            ])
        } else {
            Line::from(vec![
                Span::styled(" [Q]", key),
                Span::styled("uit  ", text),
                Span::styled("[A]", key),
                Span::styled("dd  ", text),
                Span::styled("[X]", key),
                Span::styled(" remove  ", text),
                Span::styled("[H/L]", key),
                Span::styled(" select  ", text),
            ])
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
