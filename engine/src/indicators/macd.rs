// Moving Average Convergence Divergence: line, signal, histogram
use super::ema::ema_values;
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::Candle;

pub struct Macd {
    name: String,
    short: usize,
    long: usize,
    signal: usize,
}

/// The three MACD lines, aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn new(short: usize, long: usize, signal: usize) -> Self {
        Self {
            name: format!("MACD({},{},{})", short, long, signal),
            short,
            long,
            signal,
        }
    }
}

pub fn macd_values(values: &[f64], short: usize, long: usize, signal: usize) -> MacdLines {
    let short_ema = ema_values(values, short);
    let long_ema = ema_values(values, long);
    let macd: Vec<f64> = short_ema.iter().zip(&long_ema).map(|(s, l)| s - l).collect();
    let signal = ema_values(&macd, signal);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines { macd, signal, histogram }
}

impl IndicatorCalculator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "short": self.short, "long": self.long, "signal": self.signal })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Vec<Option<f64>>> {
        let closes: Vec<f64> = data.iter().map(|c| c.close).collect();
        let lines = macd_values(&closes, self.short, self.long, self.signal);
        [lines.macd, lines.signal, lines.histogram]
            .into_iter()
            .map(|line| line.into_iter().map(Some).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_prices_give_zero_lines() {
        let lines = macd_values(&[10.0; 30], 12, 26, 9);
        assert_eq!(lines.macd.len(), 30);
        assert!(lines.macd.iter().chain(&lines.signal).chain(&lines.histogram).all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn rising_prices_give_positive_macd() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let lines = macd_values(&closes, 12, 26, 9);
        assert!(lines.macd[39] > 0.0);
        assert!((lines.histogram[39] - (lines.macd[39] - lines.signal[39])).abs() < 1e-12);
    }

    #[test]
    fn parameters_name_every_period() {
        let macd = Macd::new(12, 26, 9);
        assert_eq!(macd.name(), "MACD(12,26,9)");
        assert_eq!(macd.parameters()["signal"], 9);
    }
}
