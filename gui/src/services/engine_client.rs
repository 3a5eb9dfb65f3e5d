// gRPC client for the engine's DataFeed service
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use chart::{BacktestParams, DataFetch, FetchError};
use engine::services::{
    ChartRequest, DataFeedClient, Empty, IndicatorRequest, IndicatorResponse, LabelRequest, ProtoCandle,
    SearchRequest, SeriesRequest, StrategyRequest, StrategyResponse,
};
use shared::models::{
    Candle, DateRange, IndicatorSeries, SeriesPoint, Strategy, StrategyResult, TimeFrame, TradeSignal,
};
use shared::utils::{format_day, parse_date};
use shared::Indicator;

#[derive(Clone)]
pub struct EngineClient {
    client: DataFeedClient<Channel>,
    endpoint: String,
}

impl EngineClient {
    /// The connection is opened on first use, so the GUI starts even when the
    /// engine is not up yet.
    pub fn new(endpoint: &str) -> Result<Self, FetchError> {
        let channel = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| FetchError::Transport(format!("Invalid engine endpoint {}: {}", endpoint, e)))?
            .connect_lazy();
        Ok(Self {
            client: DataFeedClient::new(channel),
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn status_to_fetch_error(status: Status) -> FetchError {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled | Code::Unknown => {
            FetchError::Transport(status.message().to_string())
        }
        _ => FetchError::Remote(status.message().to_string()),
    }
}

fn from_proto_candle(candle: ProtoCandle) -> Result<Candle, FetchError> {
    let time = DateTime::from_timestamp_millis(candle.time)
        .ok_or_else(|| FetchError::Decode(format!("Invalid candle time {}", candle.time)))?;
    Ok(Candle {
        time,
        open: candle.open,
        high: candle.high,
        low: candle.low,
        close: candle.close,
        volume: candle.volume,
    })
}

fn from_proto_candles(candles: Vec<ProtoCandle>) -> Result<Vec<Candle>, FetchError> {
    candles.into_iter().map(from_proto_candle).collect()
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, FetchError> {
    parse_date(raw).map_err(|e| FetchError::Decode(e.to_string()))
}

fn from_indicator_response(response: IndicatorResponse) -> IndicatorSeries {
    IndicatorSeries::new(
        response
            .lines
            .into_iter()
            .map(|line| {
                line.points
                    .into_iter()
                    .map(|p| SeriesPoint { time: p.time, value: p.value })
                    .collect()
            })
            .collect(),
    )
}

fn from_strategy_response(response: StrategyResponse) -> Result<StrategyResult, FetchError> {
    let signals = response
        .signals
        .iter()
        .map(|s| s.parse::<TradeSignal>().map_err(|e| FetchError::Decode(e.to_string())))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(StrategyResult {
        signals,
        dates: response.dates,
        num_trades: response.num_trades,
        winning_trades: response.winning_trades,
        losing_trades: response.losing_trades,
        winning_percentage: response.winning_percentage,
        profit_factor: response.profit_factor,
        final_capital: response.final_capital,
        total_return_percentage: response.total_return_percentage,
    })
}

fn series_request(symbol: &str, timeframe: TimeFrame) -> SeriesRequest {
    SeriesRequest {
        symbol: symbol.to_string(),
        timeframe: timeframe.as_str().to_string(),
    }
}

#[async_trait]
impl DataFetch for EngineClient {
    async fn fetch_stock_chart(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        period1: Option<DateTime<Utc>>,
        period2: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>, FetchError> {
        let request = ChartRequest {
            symbol: symbol.to_string(),
            timeframe: timeframe.as_str().to_string(),
            period1: period1.map(|t| t.timestamp_millis()),
            period2: period2.map(|t| t.timestamp_millis()),
        };
        let response = self
            .client
            .clone()
            .fetch_stock_chart(request)
            .await
            .map_err(status_to_fetch_error)?;
        from_proto_candles(response.into_inner().candles)
    }

    async fn get_data(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, FetchError> {
        let mut stream = self
            .client
            .clone()
            .get_data(series_request(symbol, timeframe))
            .await
            .map_err(status_to_fetch_error)?
            .into_inner();

        let mut candles = Vec::new();
        while let Some(batch) = stream.message().await.map_err(status_to_fetch_error)? {
            candles.extend(from_proto_candles(batch.candles)?);
        }
        tracing::debug!(%symbol, %timeframe, count = candles.len(), "Received candles");
        Ok(candles)
    }

    async fn get_range(&self, symbol: &str, timeframe: TimeFrame) -> Result<DateRange, FetchError> {
        let response = self
            .client
            .clone()
            .get_range(series_request(symbol, timeframe))
            .await
            .map_err(status_to_fetch_error)?
            .into_inner();
        Ok(DateRange {
            from: parse_time(&response.from)?,
            to: parse_time(&response.to)?,
        })
    }

    async fn get_indicators(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        indicator: Indicator,
    ) -> Result<IndicatorSeries, FetchError> {
        let request = IndicatorRequest {
            symbol: symbol.to_string(),
            timeframe: timeframe.as_str().to_string(),
            variant: indicator.family().as_str().to_string(),
            lengths: indicator.lengths(),
        };
        let response = self
            .client
            .clone()
            .get_indicators(request)
            .await
            .map_err(status_to_fetch_error)?;
        Ok(from_indicator_response(response.into_inner()))
    }

    async fn search_indices(&self, query: &str) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .clone()
            .search_indices(SearchRequest { query: query.to_string() })
            .await
            .map_err(status_to_fetch_error)?;
        Ok(response.into_inner().symbols)
    }

    async fn add_item(&self, item: &str) -> Result<(), FetchError> {
        self.client
            .clone()
            .add_item(LabelRequest { label: item.to_string() })
            .await
            .map_err(status_to_fetch_error)?;
        Ok(())
    }

    async fn delete_label(&self, label: &str) -> Result<(), FetchError> {
        self.client
            .clone()
            .delete_label(LabelRequest { label: label.to_string() })
            .await
            .map_err(status_to_fetch_error)?;
        Ok(())
    }

    async fn get_labels(&self) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .clone()
            .get_labels(Empty {})
            .await
            .map_err(status_to_fetch_error)?;
        Ok(response.into_inner().labels)
    }

    async fn run_strategy(&self, strategy: Strategy, params: BacktestParams) -> Result<StrategyResult, FetchError> {
        let request = StrategyRequest {
            symbol: params.symbol,
            timeframe: params.timeframe.as_str().to_string(),
            from: format_day(&params.from),
            to: format_day(&params.to),
            periods: params.periods,
        };
        let mut client = self.client.clone();
        let response = match strategy {
            Strategy::Macd => client.macd_strategy(request).await,
            Strategy::TripleEma => client.three_ema_strategy(request).await,
            Strategy::Alligator => client.alligator_strategy(request).await,
        }
        .map_err(status_to_fetch_error)?;
        from_strategy_response(response.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::services::{IndicatorLine, IndicatorPoint};

    #[test]
    fn unavailable_engine_is_a_transport_error() {
        let err = status_to_fetch_error(Status::unavailable("connection refused"));
        assert_eq!(err, FetchError::Transport("connection refused".to_string()));
        let err = status_to_fetch_error(Status::invalid_argument("Unknown timeframe: 2D"));
        assert!(matches!(err, FetchError::Remote(_)));
    }

    #[test]
    fn candles_are_decoded_from_millis() {
        let candle = from_proto_candle(ProtoCandle {
            time: 1_704_153_600_000,
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        })
        .unwrap();
        assert_eq!(format_day(&candle.time), "2024-01-02");
    }

    #[test]
    fn indicator_lines_keep_their_order() {
        let response = IndicatorResponse {
            lines: vec![
                IndicatorLine {
                    points: vec![IndicatorPoint { time: "2024-01-02T00:00:00+00:00".into(), value: 1.0 }],
                },
                IndicatorLine { points: vec![] },
            ],
        };
        let series = from_indicator_response(response);
        assert_eq!(series.line_count(), 2);
        assert_eq!(series.lines[0][0].value, 1.0);
    }

    #[test]
    fn strategy_signals_are_parsed() {
        let response = StrategyResponse {
            signals: vec!["hold".into(), "buy".into()],
            dates: vec!["2024-01-01".into(), "2024-01-02".into()],
            num_trades: 1,
            ..StrategyResponse::default()
        };
        let result = from_strategy_response(response).unwrap();
        assert_eq!(result.signals, vec![TradeSignal::Hold, TradeSignal::Buy]);

        let bad = StrategyResponse {
            signals: vec!["short".into()],
            ..StrategyResponse::default()
        };
        assert!(matches!(from_strategy_response(bad), Err(FetchError::Decode(_))));
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        assert!(EngineClient::new("not a uri").is_err());
    }
}
