// gRPC surface of the engine
pub mod data_feed;

pub mod proto {
    tonic::include_proto!("datafeed");
}

pub use data_feed::DataFeedService;
pub use proto::data_feed_client::DataFeedClient;
pub use proto::data_feed_server::{DataFeed, DataFeedServer};
pub use proto::{
    Candle as ProtoCandle, CandleList, ChartRequest, Empty, IndicatorLine, IndicatorPoint, IndicatorRequest,
    IndicatorResponse, LabelList, LabelRequest, RangeResponse, SearchRequest, SearchResponse, SeriesRequest,
    StrategyRequest, StrategyResponse,
};
