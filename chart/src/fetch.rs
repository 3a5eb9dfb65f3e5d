// Command surface of the data backend, as seen from the chart.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use shared::models::{Candle, DateRange, IndicatorSeries, Strategy, StrategyResult, TimeFrame};
use shared::Indicator;

use crate::error::FetchError;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestParams {
    pub symbol: String,
    pub timeframe: TimeFrame,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub periods: Vec<u32>,
}

#[async_trait]
pub trait DataFetch: Send + Sync {
    /// With both periods, fetches exactly that window. Otherwise extends the
    /// backend's cached history backwards and returns all of it.
    async fn fetch_stock_chart(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        period1: Option<DateTime<Utc>>,
        period2: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>, FetchError>;

    async fn get_data(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, FetchError>;

    async fn get_range(&self, symbol: &str, timeframe: TimeFrame) -> Result<DateRange, FetchError>;

    async fn get_indicators(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        indicator: Indicator,
    ) -> Result<IndicatorSeries, FetchError>;

    async fn search_indices(&self, query: &str) -> Result<Vec<String>, FetchError>;

    async fn add_item(&self, item: &str) -> Result<(), FetchError>;

    async fn delete_label(&self, label: &str) -> Result<(), FetchError>;

    async fn get_labels(&self) -> Result<Vec<String>, FetchError>;

    async fn run_strategy(&self, strategy: Strategy, params: BacktestParams) -> Result<StrategyResult, FetchError>;
}
