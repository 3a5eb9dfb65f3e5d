// Exponential Moving Average (EMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::Candle;

pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("EMA({})", period),
            period: period.max(1),
        }
    }
}

/// EMA seeded with the first value, smoothing 2 / (period + 1).
pub fn ema_values(values: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };
    let k = 2.0 / (period.max(1) as f64 + 1.0);
    let mut ema = first;
    let mut results = Vec::with_capacity(values.len());
    results.push(ema);
    for value in &values[1..] {
        ema = value * k + ema * (1.0 - k);
        results.push(ema);
    }
    results
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Vec<Option<f64>>> {
        let closes: Vec<f64> = data.iter().map(|c| c.close).collect();
        vec![ema_values(&closes, self.period).into_iter().map(Some).collect()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::candles_from_closes;

    #[test]
    fn test_ema_calculation() {
        let candles = candles_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let results = &Ema::new(3).calculate(&candles)[0];
        // k = 0.5: 10, 10.5, 11.25, 12.125, 13.0625
        assert_eq!(results.len(), 5);
        assert_eq!(results[0], Some(10.0));
        assert_eq!(results[1], Some(10.5));
        assert_eq!(results[2], Some(11.25));
        assert_eq!(results[4], Some(13.0625));
    }

    #[test]
    fn test_ema_flat_series_stays_flat() {
        let values = ema_values(&[5.0; 10], 4);
        assert!(values.iter().all(|v| (v - 5.0).abs() < 1e-12));
    }

    #[test]
    fn test_ema_empty() {
        assert!(ema_values(&[], 9).is_empty());
    }
}
