// DataFeed service: owns the history loader and the watchlist file and
// dispatches each RPC to its handler module.
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

use shared::models::Strategy;

use super::{
    CandleList, ChartRequest, DataFeed, Empty, IndicatorRequest, IndicatorResponse, LabelList, LabelRequest,
    RangeResponse, SearchRequest, SearchResponse, SeriesRequest, StrategyRequest, StrategyResponse,
};
use crate::data::history::HistoryLoader;
use crate::data::watchlist::WatchlistFile;

pub mod backtest;
pub mod fetch_stock_chart;
pub mod get_data;
pub mod get_indicators;
pub mod helpers;
pub mod search_indices;
pub mod watchlist;

pub struct DataFeedService {
    history: Arc<HistoryLoader>,
    watchlist: Arc<Mutex<WatchlistFile>>,
}

impl DataFeedService {
    pub fn new(history: Arc<HistoryLoader>, watchlist: WatchlistFile) -> Self {
        DataFeedService {
            history,
            watchlist: Arc::new(Mutex::new(watchlist)),
        }
    }
}

#[tonic::async_trait]
impl DataFeed for DataFeedService {
    async fn fetch_stock_chart(&self, request: Request<ChartRequest>) -> Result<Response<CandleList>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            timeframe = %req_payload.timeframe,
            period1 = ?req_payload.period1,
            period2 = ?req_payload.period2,
            "Received FetchStockChart"
        );
        fetch_stock_chart::handle_fetch_stock_chart(req_payload, self.history.clone()).await
    }

    type GetDataStream = ReceiverStream<Result<CandleList, Status>>;
    async fn get_data(&self, request: Request<SeriesRequest>) -> Result<Response<Self::GetDataStream>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(symbol = %req_payload.symbol, timeframe = %req_payload.timeframe, "Received GetData");
        get_data::handle_get_data(req_payload, self.history.clone()).await
    }

    async fn get_range(&self, request: Request<SeriesRequest>) -> Result<Response<RangeResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::debug!(symbol = %req_payload.symbol, timeframe = %req_payload.timeframe, "Received GetRange");
        get_data::handle_get_range(req_payload, self.history.clone()).await
    }

    async fn get_indicators(&self, request: Request<IndicatorRequest>) -> Result<Response<IndicatorResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            symbol = %req_payload.symbol,
            timeframe = %req_payload.timeframe,
            variant = %req_payload.variant,
            lengths = ?req_payload.lengths,
            "Received GetIndicators"
        );
        get_indicators::handle_get_indicators(req_payload, self.history.clone()).await
    }

    async fn search_indices(&self, request: Request<SearchRequest>) -> Result<Response<SearchResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::debug!(query = %req_payload.query, "Received SearchIndices");
        search_indices::handle_search_indices(req_payload, self.history.clone()).await
    }

    async fn add_item(&self, request: Request<LabelRequest>) -> Result<Response<Empty>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(label = %req_payload.label, "Received AddItem");
        watchlist::handle_add_item(req_payload, self.watchlist.clone()).await
    }

    async fn delete_label(&self, request: Request<LabelRequest>) -> Result<Response<Empty>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(label = %req_payload.label, "Received DeleteLabel");
        watchlist::handle_delete_label(req_payload, self.watchlist.clone(), self.history.clone()).await
    }

    async fn get_labels(&self, _request: Request<Empty>) -> Result<Response<LabelList>, Status> {
        watchlist::handle_get_labels(self.watchlist.clone()).await
    }

    async fn macd_strategy(&self, request: Request<StrategyRequest>) -> Result<Response<StrategyResponse>, Status> {
        self.strategy(Strategy::Macd, request).await
    }

    async fn three_ema_strategy(&self, request: Request<StrategyRequest>) -> Result<Response<StrategyResponse>, Status> {
        self.strategy(Strategy::TripleEma, request).await
    }

    async fn alligator_strategy(&self, request: Request<StrategyRequest>) -> Result<Response<StrategyResponse>, Status> {
        self.strategy(Strategy::Alligator, request).await
    }
}

impl DataFeedService {
    async fn strategy(
        &self,
        strategy: Strategy,
        request: Request<StrategyRequest>,
    ) -> Result<Response<StrategyResponse>, Status> {
        let req_payload = request.into_inner();
        tracing::info!(
            %strategy,
            symbol = %req_payload.symbol,
            timeframe = %req_payload.timeframe,
            from = %req_payload.from,
            to = %req_payload.to,
            periods = ?req_payload.periods,
            "Received strategy backtest"
        );
        backtest::handle_strategy(strategy, req_payload, self.history.clone()).await
    }
}
