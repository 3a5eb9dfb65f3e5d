pub mod history;
pub mod market_data;
pub mod quote_client;
pub mod watchlist;
