use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistError {
    #[error("portfolio limit reached (max {capacity})")]
    Full { capacity: usize },

    #[error("{0} is already on the watchlist")]
    Duplicate(String),

    #[error("invalid ticker symbol '{0}'")]
    InvalidSymbol(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error: {0}")]
    Store(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
