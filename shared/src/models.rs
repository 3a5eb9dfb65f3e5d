use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One OHLC bar. Series of candles are kept sorted ascending by `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    #[serde(rename = "1M")]
    Minute1,
    #[serde(rename = "5M")]
    Minute5,
    #[serde(rename = "15M")]
    Minute15,
    #[serde(rename = "1H")]
    Hour1,
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "1WK")]
    Week1,
}

impl TimeFrame {
    pub const ALL: [TimeFrame; 6] = [
        TimeFrame::Minute1,
        TimeFrame::Minute5,
        TimeFrame::Minute15,
        TimeFrame::Hour1,
        TimeFrame::Day1,
        TimeFrame::Week1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1M",
            TimeFrame::Minute5 => "5M",
            TimeFrame::Minute15 => "15M",
            TimeFrame::Hour1 => "1H",
            TimeFrame::Day1 => "1D",
            TimeFrame::Week1 => "1WK",
        }
    }

    /// Length of one candle in minutes.
    pub fn minutes(&self) -> i64 {
        match self {
            TimeFrame::Minute1 => 1,
            TimeFrame::Minute5 => 5,
            TimeFrame::Minute15 => 15,
            TimeFrame::Hour1 => 60,
            TimeFrame::Day1 => 1440,
            TimeFrame::Week1 => 10080,
        }
    }

    /// Interval code understood by the Yahoo chart endpoint.
    pub fn yahoo_interval(&self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Day1 => "1d",
            TimeFrame::Week1 => "1wk",
        }
    }

    pub fn is_intraday(&self) -> bool {
        self.minutes() < TimeFrame::Day1.minutes()
    }
}

impl Default for TimeFrame {
    fn default() -> Self {
        TimeFrame::Day1
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeFrame::ALL
            .into_iter()
            .find(|tf| tf.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownTimeFrame(s.to_string()))
    }
}

/// Inclusive date window of the candles cached for one (symbol, timeframe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// A single indicator sample as it crosses the command boundary.
/// `time` stays a string until the chart converts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: String,
    pub value: f64,
}

/// Parallel, time-ordered lines produced by one indicator
/// (one line for SMA/EMA/RSI/VOLUME, three for MACD).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub lines: Vec<Vec<SeriesPoint>>,
}

impl IndicatorSeries {
    pub fn new(lines: Vec<Vec<SeriesPoint>>) -> Self {
        Self { lines }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Strategy {
    Macd,
    TripleEma,
    Alligator,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Macd, Strategy::TripleEma, Strategy::Alligator];

    /// Periods used when the caller does not pick any.
    pub fn default_periods(&self) -> Vec<u32> {
        match self {
            Strategy::Macd => vec![12, 26, 9],
            Strategy::TripleEma => vec![9, 21, 55],
            Strategy::Alligator => vec![13, 8, 5],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Macd => "MACD",
            Strategy::TripleEma => "Triple EMA",
            Strategy::Alligator => "Alligator",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Strategy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownStrategy(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

impl TradeSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSignal::Buy => "buy",
            TradeSignal::Sell => "sell",
            TradeSignal::Hold => "hold",
        }
    }
}

impl FromStr for TradeSignal {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(TradeSignal::Buy),
            "sell" => Ok(TradeSignal::Sell),
            "hold" => Ok(TradeSignal::Hold),
            other => Err(ParseError::UnknownSignal(other.to_string())),
        }
    }
}

/// Outcome of one strategy backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    pub signals: Vec<TradeSignal>,
    pub dates: Vec<String>,
    pub num_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    pub winning_percentage: f64,
    pub profit_factor: f64,
    pub final_capital: f64,
    pub total_return_percentage: f64,
}
