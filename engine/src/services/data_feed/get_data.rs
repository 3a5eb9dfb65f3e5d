// Handlers for the GetData (streaming) and GetRange RPCs
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Response, Status};

use shared::models::Candle;

use super::helpers::{parse_timeframe, require_symbol, to_proto_candle};
use crate::data::history::HistoryLoader;
use crate::services::{CandleList, RangeResponse, SeriesRequest};

/// Candles per streamed message.
pub const BATCH_SIZE: usize = 500;

/// Splits the series into stream messages. An empty series still yields one
/// empty message so the client can tell "no data" from a dropped stream.
pub fn batches(candles: &[Candle]) -> Vec<CandleList> {
    if candles.is_empty() {
        return vec![CandleList { candles: Vec::new() }];
    }
    candles
        .chunks(BATCH_SIZE)
        .map(|chunk| CandleList {
            candles: chunk.iter().map(to_proto_candle).collect(),
        })
        .collect()
}

pub async fn handle_get_data(
    req_payload: SeriesRequest,
    history: Arc<HistoryLoader>,
) -> Result<Response<ReceiverStream<Result<CandleList, Status>>>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?.to_string();
    let timeframe = parse_timeframe(&req_payload.timeframe)?;

    let candles = history.get_data(&symbol, timeframe).await?;
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        let messages = batches(&candles);
        tracing::debug!(%symbol, %timeframe, count = candles.len(), batches = messages.len(), "Streaming candles");
        for message in messages {
            if let Err(e) = tx.send(Ok(message)).await {
                tracing::warn!(error = ?e, %symbol, "Client went away while streaming candles");
                return;
            }
        }
    });

    Ok(Response::new(ReceiverStream::new(rx)))
}

pub async fn handle_get_range(
    req_payload: SeriesRequest,
    history: Arc<HistoryLoader>,
) -> Result<Response<RangeResponse>, Status> {
    let symbol = require_symbol(&req_payload.symbol)?;
    let timeframe = parse_timeframe(&req_payload.timeframe)?;
    let range = history.range(symbol, timeframe).await?;
    Ok(Response::new(RangeResponse {
        from: range.from.to_rfc3339(),
        to: range.to.to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::candles_from_closes;

    #[test]
    fn long_series_are_split() {
        let candles = candles_from_closes(&vec![1.0; 1201]);
        let sizes: Vec<usize> = batches(&candles).iter().map(|b| b.candles.len()).collect();
        assert_eq!(sizes, vec![500, 500, 201]);
    }

    #[test]
    fn empty_series_sends_one_empty_batch() {
        let messages = batches(&[]);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].candles.is_empty());
    }
}
