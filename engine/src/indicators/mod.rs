// Technical indicators module
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use ema::Ema;
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volume::Volume;

use serde_json::Value;
use shared::models::{Candle, IndicatorSeries, SeriesPoint};
use shared::Indicator;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value;
    /// One vector per output line, aligned with `data`. `None` where the
    /// indicator has no value yet.
    fn calculate(&self, data: &[Candle]) -> Vec<Vec<Option<f64>>>;
}

pub fn calculator_for(indicator: &Indicator) -> Box<dyn IndicatorCalculator> {
    match *indicator {
        Indicator::Sma(period) => Box::new(Sma::new(period as usize)),
        Indicator::Ema(period) => Box::new(Ema::new(period as usize)),
        Indicator::Rsi(period) => Box::new(Rsi::new(period as usize)),
        Indicator::Macd { short, long, signal } => Box::new(Macd::new(short as usize, long as usize, signal as usize)),
        Indicator::Volume => Box::new(Volume),
    }
}

/// Pairs each computed value with its candle's time, skipping gaps.
pub fn to_series(data: &[Candle], lines: Vec<Vec<Option<f64>>>) -> IndicatorSeries {
    IndicatorSeries::new(
        lines
            .into_iter()
            .map(|line| {
                data.iter()
                    .zip(line)
                    .filter_map(|(candle, value)| {
                        value.map(|value| SeriesPoint {
                            time: candle.time.to_rfc3339(),
                            value,
                        })
                    })
                    .collect()
            })
            .collect(),
    )
}

pub fn compute(indicator: &Indicator, data: &[Candle]) -> IndicatorSeries {
    let calculator = calculator_for(indicator);
    tracing::debug!(indicator = calculator.name(), parameters = %calculator.parameters(), candles = data.len(), "Computing indicator");
    to_series(data, calculator.calculate(data))
}

#[cfg(test)]
pub(crate) fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            time: start + Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0 * (i + 1) as f64,
        })
        .collect()
}
