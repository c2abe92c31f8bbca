use crate::error::WatchlistError;

pub const DEFAULT_CAPACITY: usize = 5;
pub const MAX_SYMBOL_LEN: usize = 10;

pub const DEFAULT_MARKETS: &[&str] = &[
    "GOOG", "TSLA", "AMZN", "META", "NVDA", "MSFT", "AAPL", "NFLX", "AMD", "INTC",
];

/// Ordered set of watched tickers with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watchlist {
    symbols: Vec<String>,
    capacity: usize,
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Watchlist {
    pub fn new(capacity: usize) -> Self {
        Self {
            symbols: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a watchlist from stored symbols. Stored data is trusted for
    /// order but re-normalized; anything past capacity is kept so the
    /// dashboard still shows it, and `is_full` blocks further adds.
    pub fn from_symbols(symbols: &[String], capacity: usize) -> Self {
        let mut out = Self::new(capacity);
        for sym in symbols {
            let s = sym.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.contains(&s) {
                out.symbols.push(s);
            }
        }
        out
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.symbols.len() >= self.capacity
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.symbols.iter().any(|s| s.eq_ignore_ascii_case(ticker.trim()))
    }

    pub fn add(&mut self, ticker: &str) -> Result<String, WatchlistError> {
        let symbol = validate_symbol(ticker)?;
        if self.is_full() {
            return Err(WatchlistError::Full {
                capacity: self.capacity,
            });
        }
        if self.contains(&symbol) {
            return Err(WatchlistError::Duplicate(symbol));
        }
        self.symbols.push(symbol.clone());
        Ok(symbol)
    }

    /// Removing a symbol that is not present is a no-op.
    pub fn remove(&mut self, ticker: &str) -> bool {
        let before = self.symbols.len();
        self.symbols.retain(|s| !s.eq_ignore_ascii_case(ticker.trim()));
        self.symbols.len() != before
    }
}

pub fn validate_symbol(ticker: &str) -> Result<String, WatchlistError> {
    let symbol = ticker.trim().to_ascii_uppercase();
    let valid = !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && symbol.chars().all(|c| c.is_ascii_alphabetic());
    if valid {
        Ok(symbol)
    } else {
        Err(WatchlistError::InvalidSymbol(ticker.to_string()))
    }
}

/// Markets a user may add to their watchlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCatalog {
    symbols: Vec<String>,
}

impl Default for MarketCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MARKETS.iter().map(|s| s.to_string()).collect())
    }
}

impl MarketCatalog {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn unused(&self, watchlist: &Watchlist) -> Vec<String> {
        self.symbols
            .iter()
            .filter(|s| !watchlist.contains(s))
            .cloned()
            .collect()
    }

    /// Unused markets whose symbol contains `query`, case-insensitively.
    pub fn search(&self, watchlist: &Watchlist, query: &str) -> Vec<String> {
        let needle = query.trim().to_ascii_lowercase();
        self.unused(watchlist)
            .into_iter()
            .filter(|s| s.to_ascii_lowercase().contains(&needle))
            .collect()
    }
}
