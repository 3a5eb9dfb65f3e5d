// Explicit state containers the controller owns and the UI reads.
pub mod backtest;
pub mod search;
pub mod timeframe;
pub mod watchlist;

pub use backtest::BacktestStore;
pub use search::SearchStore;
pub use timeframe::TimeframeStore;
pub use watchlist::WatchlistStore;
