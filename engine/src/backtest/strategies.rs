// Signal generators, one signal per candle
use shared::models::{Candle, TradeSignal};

use crate::error::EngineError;
use crate::indicators::ema::ema_values;
use crate::indicators::macd::macd_values;

/// Forward displacement of the Alligator lines, in bars.
const JAW_SHIFT: usize = 8;
const TEETH_SHIFT: usize = 5;
const LIPS_SHIFT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trend {
    Bullish,
    Bearish,
    Mixed,
}

fn trend_of(fast: f64, middle: f64, slow: f64) -> Trend {
    if fast > middle && middle > slow {
        Trend::Bullish
    } else if fast < middle && middle < slow {
        Trend::Bearish
    } else {
        Trend::Mixed
    }
}

/// Buy when three lines newly stack bullish, sell when they newly stack
/// bearish. `None` marks bars still warming up.
fn alignment_signals(trends: impl Iterator<Item = Option<Trend>>) -> Vec<TradeSignal> {
    let mut previous = Trend::Mixed;
    trends
        .map(|trend| {
            let Some(trend) = trend else {
                return TradeSignal::Hold;
            };
            let signal = match trend {
                Trend::Bullish if previous != Trend::Bullish => TradeSignal::Buy,
                Trend::Bearish if previous != Trend::Bearish => TradeSignal::Sell,
                _ => TradeSignal::Hold,
            };
            previous = trend;
            signal
        })
        .collect()
}

fn three_periods(name: &str, periods: &[u32]) -> Result<[usize; 3], EngineError> {
    match periods {
        &[a, b, c] if a > 0 && b > 0 && c > 0 => Ok([a as usize, b as usize, c as usize]),
        _ => Err(EngineError::BacktestError(format!(
            "{} needs three positive periods, got {:?}",
            name, periods
        ))),
    }
}

fn closes(data: &[Candle]) -> Vec<f64> {
    data.iter().map(|c| c.close).collect()
}

/// `periods` = [short, long, signal]. Buy when the MACD line crosses above
/// its signal line, sell when it crosses below.
pub fn macd_signals(data: &[Candle], periods: &[u32]) -> Result<Vec<TradeSignal>, EngineError> {
    let [short, long, signal] = three_periods("MACD", periods)?;
    let lines = macd_values(&closes(data), short, long, signal);

    let mut signals = vec![TradeSignal::Hold; data.len()];
    for i in 1..data.len() {
        let was_above = lines.macd[i - 1] > lines.signal[i - 1];
        let is_above = lines.macd[i] > lines.signal[i];
        let was_below = lines.macd[i - 1] < lines.signal[i - 1];
        let is_below = lines.macd[i] < lines.signal[i];
        if is_above && !was_above {
            signals[i] = TradeSignal::Buy;
        } else if is_below && !was_below {
            signals[i] = TradeSignal::Sell;
        }
    }
    Ok(signals)
}

/// `periods` = [fast, middle, slow] EMA lengths.
pub fn three_ema_signals(data: &[Candle], periods: &[u32]) -> Result<Vec<TradeSignal>, EngineError> {
    let [fast, middle, slow] = three_periods("Triple EMA", periods)?;
    let closes = closes(data);
    let fast = ema_values(&closes, fast);
    let middle = ema_values(&closes, middle);
    let slow = ema_values(&closes, slow);

    Ok(alignment_signals(
        (0..data.len()).map(|i| Some(trend_of(fast[i], middle[i], slow[i]))),
    ))
}

/// Smoothed moving average (Wilder), seeded with the first value.
pub fn smma_values(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1) as f64;
    let mut results = Vec::with_capacity(values.len());
    let mut smma = match values.first() {
        Some(&first) => first,
        None => return results,
    };
    for &value in values {
        smma = (smma * (period - 1.0) + value) / period;
        results.push(smma);
    }
    results
}

/// Williams Alligator on the median price. `periods` = [jaw, teeth, lips];
/// the lines are shifted forward by 8, 5 and 3 bars.
pub fn alligator_signals(data: &[Candle], periods: &[u32]) -> Result<Vec<TradeSignal>, EngineError> {
    let [jaw_period, teeth_period, lips_period] = three_periods("Alligator", periods)?;
    let median: Vec<f64> = data.iter().map(|c| (c.high + c.low) / 2.0).collect();
    let jaw = smma_values(&median, jaw_period);
    let teeth = smma_values(&median, teeth_period);
    let lips = smma_values(&median, lips_period);

    // first bar where every shifted line has seen a full period
    let warmup = (jaw_period + JAW_SHIFT)
        .max(teeth_period + TEETH_SHIFT)
        .max(lips_period + LIPS_SHIFT)
        - 1;

    Ok(alignment_signals((0..data.len()).map(|i| {
        (i >= warmup).then(|| trend_of(lips[i - LIPS_SHIFT], teeth[i - TEETH_SHIFT], jaw[i - JAW_SHIFT]))
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::candles_from_closes;

    fn rise_then_fall(n: usize) -> Vec<Candle> {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 + i as f64)
            .chain((0..n).map(|i| 100.0 + n as f64 - i as f64))
            .collect();
        candles_from_closes(&closes)
    }

    fn first_active(signals: &[TradeSignal]) -> Option<(usize, TradeSignal)> {
        signals
            .iter()
            .copied()
            .enumerate()
            .find(|(_, s)| *s != TradeSignal::Hold)
    }

    #[test]
    fn macd_sells_the_decline_and_buys_after_a_bottom() {
        let closes: Vec<f64> = (0..30)
            .map(|i| 100.0 - i as f64)
            .chain((0..30).map(|i| 71.0 + i as f64))
            .collect();
        let signals = macd_signals(&candles_from_closes(&closes), &[3, 6, 3]).unwrap();

        assert_eq!(signals.len(), 60);
        assert_eq!(first_active(&signals), Some((1, TradeSignal::Sell)));
        assert!(!signals[..30].contains(&TradeSignal::Buy));
        assert!(signals[30..].contains(&TradeSignal::Buy));
    }

    #[test]
    fn macd_needs_three_periods() {
        let data = candles_from_closes(&[1.0, 2.0]);
        assert!(matches!(macd_signals(&data, &[12, 26]), Err(EngineError::BacktestError(_))));
        assert!(macd_signals(&data, &[12, 0, 9]).is_err());
    }

    #[test]
    fn triple_ema_follows_the_trend() {
        let signals = three_ema_signals(&rise_then_fall(80), &[9, 21, 55]).unwrap();

        assert_eq!(first_active(&signals), Some((1, TradeSignal::Buy)));
        assert_eq!(signals[..80].iter().filter(|s| **s != TradeSignal::Hold).count(), 1);
        assert!(signals[80..].contains(&TradeSignal::Sell));
    }

    #[test]
    fn alligator_waits_for_the_shifted_jaw() {
        let signals = alligator_signals(&rise_then_fall(60), &[13, 8, 5]).unwrap();

        assert_eq!(first_active(&signals), Some((20, TradeSignal::Buy)));
        assert!(signals[60..].contains(&TradeSignal::Sell));
    }

    #[test]
    fn alligator_on_short_history_holds() {
        let signals = alligator_signals(&candles_from_closes(&[1.0; 10]), &[13, 8, 5]).unwrap();
        assert!(signals.iter().all(|s| *s == TradeSignal::Hold));
    }

    #[test]
    fn smma_converges_on_flat_input() {
        let values = smma_values(&[4.0, 4.0, 4.0], 5);
        assert_eq!(values, vec![4.0, 4.0, 4.0]);
    }
}
