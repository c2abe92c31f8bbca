pub mod config;
pub mod error;
pub mod event;
pub mod input;
pub mod model;
pub mod simulator;
pub mod ui;
pub mod watchlist;
pub mod watchlist_store;
