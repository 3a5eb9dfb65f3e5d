// Quote source backed by the HTTP proxy
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use shared::models::{Candle, TimeFrame};

use crate::error::EngineError;

#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quotes(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>, EngineError>;

    async fn search(&self, query: &str) -> Result<Vec<String>, EngineError>;
}

/// One quote as the proxy returns it; any price may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuote {
    pub date: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

/// Drops incomplete quotes, sorts by date and stitches gaps so each
/// candle opens at the previous close.
pub fn normalize_quotes(raw: Vec<RawQuote>) -> Vec<Candle> {
    let total = raw.len();
    let mut candles: Vec<Candle> = raw
        .into_iter()
        .filter_map(|q| {
            Some(Candle {
                time: q.date,
                open: q.open?,
                high: q.high?,
                low: q.low?,
                close: q.close?,
                volume: q.volume.unwrap_or(0.0),
            })
        })
        .collect();
    if candles.len() < total {
        debug!(dropped = total - candles.len(), "Dropped incomplete quotes");
    }
    candles.sort_by_key(|c| c.time);

    for i in 1..candles.len() {
        candles[i].open = candles[i - 1].close;
    }
    candles
}

pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QuoteSource for ProxyClient {
    async fn quotes(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>, EngineError> {
        let url = format!("{}/stock/chart/{}", self.base_url, symbol);
        debug!(%symbol, %timeframe, %from, %to, "Requesting quotes from proxy");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("timeframe", timeframe.as_str().to_string()),
                ("period1", from.to_rfc3339()),
                ("period2", to.to_rfc3339()),
            ])
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let raw: Vec<RawQuote> = response.json().await?;
                Ok(normalize_quotes(raw))
            }
            status => {
                warn!(%symbol, %timeframe, %status, "Proxy refused quote request");
                Err(EngineError::UpstreamError(format!("Failed to fetch stock data: HTTP {}", status)))
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, EngineError> {
        let url = format!("{}/search-stocks/{}", self.base_url, query);
        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => Err(EngineError::UpstreamError(format!("Search failed: HTTP {}", status))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(json: &str) -> RawQuote {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn incomplete_quotes_are_dropped() {
        let raw = vec![
            quote(r#"{"date":"2024-01-03T00:00:00Z","open":2,"high":3,"low":1,"close":2.5,"volume":100}"#),
            quote(r#"{"date":"2024-01-04T00:00:00Z","open":null,"high":3,"low":1,"close":2.5,"volume":100}"#),
            quote(r#"{"date":"2024-01-05T00:00:00Z","high":3,"low":1,"open":1,"close":2}"#),
        ];
        let candles = normalize_quotes(raw);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].volume, 0.0);
    }

    #[test]
    fn quotes_are_sorted_and_stitched() {
        let raw = vec![
            quote(r#"{"date":"2024-01-05T00:00:00Z","open":9,"high":12,"low":8,"close":11,"volume":1}"#),
            quote(r#"{"date":"2024-01-03T00:00:00Z","open":4,"high":6,"low":3,"close":5,"volume":1}"#),
        ];
        let candles = normalize_quotes(raw);
        assert!(candles[0].time < candles[1].time);
        assert_eq!(candles[0].open, 4.0);
        assert_eq!(candles[1].open, 5.0);
    }
}
