// Drawing surface abstraction the chart logic renders into.
use shared::models::Candle;

use crate::error::ChartError;
use crate::layout::{ScaleId, ScaleMargins};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Line,
    Histogram,
}

/// One sample in chart time (UNIX seconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub time: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandlePoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Candle> for CandlePoint {
    fn from(candle: &Candle) -> Self {
        CandlePoint {
            time: candle.time.timestamp(),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
        }
    }
}

pub trait ChartSurface {
    /// Replaces the candlestick data wholesale.
    fn set_price_data(&mut self, candles: &[Candle]);

    fn add_series(&mut self, kind: SeriesKind, scale: ScaleId, color: &str) -> SeriesHandle;

    fn set_series_data(&mut self, handle: SeriesHandle, points: Vec<ChartPoint>) -> Result<(), ChartError>;

    fn remove_series(&mut self, handle: SeriesHandle) -> Result<(), ChartError>;

    fn apply_scale_margins(&mut self, scale: ScaleId, margins: ScaleMargins);

    fn subscribe_visible_range(&mut self) -> SubscriptionId;

    fn unsubscribe_visible_range(&mut self, id: SubscriptionId);
}
