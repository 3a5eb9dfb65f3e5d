// Traded volume per candle
use super::IndicatorCalculator;
use serde_json::Value;
use shared::models::Candle;

pub struct Volume;

impl IndicatorCalculator for Volume {
    fn name(&self) -> &str {
        "VOLUME"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({})
    }

    fn calculate(&self, data: &[Candle]) -> Vec<Vec<Option<f64>>> {
        vec![data.iter().map(|c| Some(c.volume)).collect()]
    }
}
