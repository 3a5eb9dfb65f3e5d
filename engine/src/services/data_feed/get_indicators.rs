// Handler for the GetIndicators RPC
use std::sync::Arc;

use tonic::{Response, Status};

use shared::{Indicator, IndicatorFamily};

use super::helpers::{parse_timeframe, require_symbol, to_indicator_response};
use crate::data::history::HistoryLoader;
use crate::error::EngineError;
use crate::indicators;
use crate::services::{IndicatorRequest, IndicatorResponse};

pub async fn handle_get_indicators(
    req_payload: IndicatorRequest,
    history: Arc<HistoryLoader>,
) -> Result<Response<IndicatorResponse>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?;
    let timeframe = parse_timeframe(&req_payload.timeframe)?;
    let family: IndicatorFamily = req_payload.variant.parse().map_err(EngineError::from)?;
    let indicator = Indicator::from_parts(family, &req_payload.lengths).map_err(EngineError::from)?;

    let candles = history.get_data(symbol, timeframe).await?;
    let series = indicators::compute(&indicator, &candles);
    tracing::debug!(%symbol, %timeframe, %indicator, lines = series.line_count(), "Indicator computed");

    Ok(Response::new(to_indicator_response(series)))
}
