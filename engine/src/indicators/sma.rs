// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::Candle;

pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("SMA({})", period),
            period: period.max(1),
        }
    }
}

/// Rolling mean; before a full window is available the mean of what has
/// been seen so far is used.
pub fn sma_values(values: &[f64], period: usize) -> Vec<f64> {
    let period = period.max(1);
    let mut results = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }
        let count = (i + 1).min(period);
        results.push(sum / count as f64);
    }
    results
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Vec<Option<f64>>> {
        let closes: Vec<f64> = data.iter().map(|c| c.close).collect();
        vec![sma_values(&closes, self.period).into_iter().map(Some).collect()]
    }
}
