use crate::model::price::PriceTable;

#[derive(Debug, Clone)]
pub enum AppEvent {
    PricesUpdated(PriceTable),
    WatchlistChanged(Vec<String>),
    LogMessage(String),
    Error(String),
}
