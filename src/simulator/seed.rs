use super::random::RandomSource;

/// Fixed opening prices for the recognized large-cap basket.
pub const KNOWN_BASE_PRICES: &[(&str, f64)] = &[
    ("GOOG", 175.0),
    ("GOOGL", 175.0),
    ("TSLA", 250.0),
    ("AMZN", 180.0),
    ("META", 500.0),
    ("NVDA", 900.0),
    ("MSFT", 420.0),
    ("AAPL", 170.0),
];

pub const UNKNOWN_BASE_MIN: f64 = 50.0;
pub const UNKNOWN_BASE_SPAN: f64 = 100.0;

pub fn known_base_price(ticker: &str) -> Option<f64> {
    KNOWN_BASE_PRICES
        .iter()
        .find(|(symbol, _)| *symbol == ticker)
        .map(|(_, price)| *price)
}

/// Opening price for a ticker seen for the first time. Unrecognized symbols
/// get a whole-dollar price in `[50, 150)`.
pub fn base_price(ticker: &str, random: &mut dyn RandomSource) -> f64 {
    match known_base_price(ticker) {
        Some(price) => price,
        None => (random.next_unit() * UNKNOWN_BASE_SPAN).floor() + UNKNOWN_BASE_MIN,
    }
}
