// Handler shared by the three strategy RPCs
use std::sync::Arc;

use tonic::{Response, Status};

use shared::models::Strategy;
use shared::utils::parse_date;

use super::helpers::{parse_timeframe, require_symbol, to_strategy_response};
use crate::backtest;
use crate::data::history::HistoryLoader;
use crate::error::EngineError;
use crate::services::{StrategyRequest, StrategyResponse};

pub async fn handle_strategy(
    strategy: Strategy,
    req_payload: StrategyRequest,
    history: Arc<HistoryLoader>,
) -> Result<Response<StrategyResponse>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?;
    let timeframe = parse_timeframe(&req_payload.timeframe)?;
    let from = parse_date(&req_payload.from).map_err(EngineError::from)?;
    let to = parse_date(&req_payload.to).map_err(EngineError::from)?;

    let candles = history.fetch_window(symbol, timeframe, from, to).await?;
    if candles.is_empty() {
        return Err(EngineError::MarketDataError(format!("Candles not found for {} between {} and {}", symbol, from, to)).into());
    }
    let result = backtest::run_strategy(strategy, &candles, &req_payload.periods)?;
    Ok(Response::new(to_strategy_response(result)))
}
