// Cached price history per symbol and timeframe
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use shared::models::{Candle, DateRange, TimeFrame};
use shared::utils::history_floor;

/// Candles held for one (symbol, timeframe) plus the window they were
/// requested for. `from` only ever moves backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCache {
    pub candles: Vec<Candle>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Set once an extension failed; no further extension is attempted.
    pub exhausted: bool,
}

impl SeriesCache {
    pub fn range(&self) -> DateRange {
        DateRange {
            from: self.from,
            to: self.to,
        }
    }

    pub fn reaches_floor(&self) -> bool {
        self.from <= history_floor()
    }
}

/// How far back one load reaches for each timeframe.
pub fn window_step(timeframe: TimeFrame) -> Duration {
    match timeframe {
        TimeFrame::Minute1 => Duration::days(3),
        TimeFrame::Minute5 | TimeFrame::Minute15 => Duration::days(30),
        TimeFrame::Hour1 => Duration::weeks(15),
        TimeFrame::Day1 => Duration::days(4 * 365),
        TimeFrame::Week1 => Duration::days(7 * 365),
    }
}

/// Start of the window ending at `end`, never before 2000-01-01.
pub fn window_start(timeframe: TimeFrame, end: DateTime<Utc>) -> DateTime<Utc> {
    (end - window_step(timeframe)).max(history_floor())
}

pub struct MarketDataStore {
    data: HashMap<String, HashMap<TimeFrame, SeriesCache>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore { data: HashMap::new() }
    }

    pub fn get(&self, symbol: &str, timeframe: TimeFrame) -> Option<&SeriesCache> {
        self.data.get(symbol).and_then(|symbol_data| symbol_data.get(&timeframe))
    }

    pub fn get_mut(&mut self, symbol: &str, timeframe: TimeFrame) -> Option<&mut SeriesCache> {
        self.data
            .get_mut(symbol)
            .and_then(|symbol_data| symbol_data.get_mut(&timeframe))
    }

    /// Merges `new_candles` into the series and widens its window to cover
    /// `from..to`. Candles stay sorted with one candle per timestamp.
    pub fn add_candles(
        &mut self,
        symbol: &str,
        timeframe: TimeFrame,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        new_candles: Vec<Candle>,
    ) {
        let symbol_data = self.data.entry(symbol.to_string()).or_default();
        let series = symbol_data.entry(timeframe).or_insert_with(|| SeriesCache {
            candles: Vec::new(),
            from,
            to,
            exhausted: false,
        });

        series.from = series.from.min(from);
        series.to = series.to.max(to);

        // newer data wins for duplicate timestamps
        let mut merged = new_candles;
        merged.extend(series.candles.drain(..));
        merged.sort_by_key(|c| c.time);
        merged.dedup_by_key(|c| c.time);
        series.candles = merged;
    }

    pub fn mark_exhausted(&mut self, symbol: &str, timeframe: TimeFrame) {
        if let Some(series) = self.get_mut(symbol, timeframe) {
            series.exhausted = true;
        }
    }

    pub fn get_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        from_timestamp: Option<DateTime<Utc>>,
        to_timestamp: Option<DateTime<Utc>>,
    ) -> Option<Vec<Candle>> {
        self.get(symbol, timeframe).map(|series| {
            series
                .candles
                .iter()
                .filter(|c| from_timestamp.map_or(true, |start| c.time >= start))
                .filter(|c| to_timestamp.map_or(true, |end| c.time <= end))
                .cloned()
                .collect()
        })
    }

    pub fn range(&self, symbol: &str, timeframe: TimeFrame) -> Option<DateRange> {
        self.get(symbol, timeframe).map(SeriesCache::range)
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}
