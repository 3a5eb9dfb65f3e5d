// Handler for the FetchStockChart RPC
use std::sync::Arc;

use tonic::{Response, Status};

use super::helpers::{from_millis, parse_timeframe, require_symbol, to_proto_candle};
use crate::data::history::HistoryLoader;
use crate::services::{CandleList, ChartRequest};

pub async fn handle_fetch_stock_chart(
    req_payload: ChartRequest,
    history: Arc<HistoryLoader>,
) -> Result<Response<CandleList>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?;
    let timeframe = parse_timeframe(&req_payload.timeframe)?;

    let candles = match (req_payload.period1, req_payload.period2) {
        (Some(period1), Some(period2)) => {
            let (from, to) = (from_millis(period1)?, from_millis(period2)?);
            tracing::debug!(%symbol, %timeframe, %from, %to, "Fetching explicit window");
            history.fetch_window(symbol, timeframe, from, to).await?
        }
        _ => history.extend_history(symbol, timeframe).await?,
    };

    Ok(Response::new(CandleList {
        candles: candles.iter().map(to_proto_candle).collect(),
    }))
}
