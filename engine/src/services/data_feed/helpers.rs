// Conversions between domain types and the wire messages
use chrono::{DateTime, Utc};

use shared::models::{Candle, IndicatorSeries, StrategyResult, TimeFrame};

use crate::error::EngineError;
use crate::services::{IndicatorLine, IndicatorPoint, IndicatorResponse, ProtoCandle, StrategyResponse};

pub fn to_proto_candle(candle: &Candle) -> ProtoCandle {
    ProtoCandle {
        time: candle.time.timestamp_millis(),
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volume: candle.volume,
    }
}

pub fn from_millis(ms: i64) -> Result<DateTime<Utc>, EngineError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| EngineError::InvalidArgument(format!("Invalid timestamp: {}", ms)))
}

/// An empty code selects the default timeframe.
pub fn parse_timeframe(code: &str) -> Result<TimeFrame, EngineError> {
    if code.trim().is_empty() {
        return Ok(TimeFrame::default());
    }
    Ok(code.parse()?)
}

pub fn require_symbol(symbol: &str) -> Result<&str, EngineError> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(EngineError::InvalidArgument("Symbol must not be empty".to_string()));
    }
    Ok(symbol)
}

pub fn to_indicator_response(series: IndicatorSeries) -> IndicatorResponse {
    IndicatorResponse {
        lines: series
            .lines
            .into_iter()
            .map(|line| IndicatorLine {
                points: line
                    .into_iter()
                    .map(|p| IndicatorPoint { time: p.time, value: p.value })
                    .collect(),
            })
            .collect(),
    }
}

pub fn to_strategy_response(result: StrategyResult) -> StrategyResponse {
    StrategyResponse {
        signals: result.signals.iter().map(|s| s.as_str().to_string()).collect(),
        dates: result.dates,
        num_trades: result.num_trades,
        winning_trades: result.winning_trades,
        losing_trades: result.losing_trades,
        winning_percentage: result.winning_percentage,
        profit_factor: result.profit_factor,
        final_capital: result.final_capital,
        total_return_percentage: result.total_return_percentage,
    }
}
