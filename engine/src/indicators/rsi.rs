// Relative Strength Index (RSI) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::Candle;

pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self {
            name: format!("RSI({})", period),
            period: period.max(1),
        }
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    // Gains and losses are summed over the trailing `period` changes.
    fn calculate(&self, data: &[Candle]) -> Vec<Vec<Option<f64>>> {
        let mut results = vec![None; data.len().min(self.period)];

        for i in self.period..data.len() {
            let (mut gains, mut losses) = (0.0, 0.0);
            for j in (i + 1 - self.period)..=i {
                let change = data[j].close - data[j - 1].close;
                if change > 0.0 {
                    gains += change;
                } else {
                    losses -= change;
                }
            }

            if losses == 0.0 {
                results.push(Some(100.0)); // no losses in the window
            } else {
                let rs = gains / losses;
                results.push(Some(100.0 - 100.0 / (1.0 + rs)));
            }
        }
        vec![results]
    }
}
