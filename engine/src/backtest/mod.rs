// Strategy backtests
pub mod performance;
pub mod strategies;

use shared::models::{Candle, Strategy, StrategyResult};

use crate::error::EngineError;

pub use performance::calculate_performance;

/// Runs `strategy` over `data`. Empty `periods` selects the strategy's defaults.
pub fn run_strategy(strategy: Strategy, data: &[Candle], periods: &[u32]) -> Result<StrategyResult, EngineError> {
    let defaults;
    let periods = if periods.is_empty() {
        defaults = strategy.default_periods();
        &defaults[..]
    } else {
        periods
    };

    let signals = match strategy {
        Strategy::Macd => strategies::macd_signals(data, periods)?,
        Strategy::TripleEma => strategies::three_ema_signals(data, periods)?,
        Strategy::Alligator => strategies::alligator_signals(data, periods)?,
    };
    let result = calculate_performance(data, &signals);
    tracing::info!(
        strategy = %strategy,
        candles = data.len(),
        trades = result.num_trades,
        final_capital = result.final_capital,
        "Backtest finished"
    );
    Ok(result)
}
