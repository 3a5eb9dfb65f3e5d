// Yahoo Finance chart and search endpoints
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProxySettings;
use crate::error::ProxyError;

/// One bar as served to the engine. Prices are missing where Yahoo has a gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub date: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub adjclose: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: String,
    pub currency: Option<String>,
    pub exchange_name: Option<String>,
    pub instrument_type: Option<String>,
    pub regular_market_price: Option<f64>,
    pub data_granularity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub meta: ChartMeta,
    pub quotes: Vec<Quote>,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        period1: DateTime<Utc>,
        period2: DateTime<Utc>,
    ) -> Result<ChartData, ProxyError>;

    async fn search(&self, query: &str) -> Result<Vec<String>, ProxyError>;
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
    #[serde(default)]
    adjclose: Vec<AdjCloseColumn>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct AdjCloseColumn {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

fn column(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

/// Turns Yahoo's column layout into one record per timestamp.
pub fn parse_chart(envelope: ChartEnvelope) -> Result<ChartData, ProxyError> {
    if let Some(err) = envelope.chart.error {
        return Err(ProxyError::Upstream(format!("{}: {}", err.code, err.description)));
    }
    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ProxyError::Upstream("Chart response had no result".to_string()))?;

    let columns = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result.indicators.adjclose.into_iter().next().unwrap_or_default().adjclose;

    let quotes = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            Some(Quote {
                date: DateTime::from_timestamp(ts, 0)?,
                open: column(&columns.open, i),
                high: column(&columns.high, i),
                low: column(&columns.low, i),
                close: column(&columns.close, i),
                volume: column(&columns.volume, i),
                adjclose: column(&adjclose, i),
            })
        })
        .collect();

    Ok(ChartData {
        meta: result.meta,
        quotes,
    })
}

#[derive(Debug, Deserialize)]
pub struct SearchEnvelope {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
}

pub fn parse_search(envelope: SearchEnvelope) -> Vec<String> {
    envelope.quotes.into_iter().filter_map(|q| q.symbol).collect()
}

pub struct YahooFinance {
    client: reqwest::Client,
    chart_base_url: String,
    search_base_url: String,
}

impl YahooFinance {
    pub fn new(settings: &ProxySettings) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            // the endpoints reject requests without a browser-like agent
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)")
            .build()?;
        Ok(Self {
            client,
            chart_base_url: settings.chart_base_url.trim_end_matches('/').to_string(),
            search_base_url: settings.search_base_url.clone(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, ProxyError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Yahoo response");
        // chart errors come back as JSON with a 4xx status
        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ProxyError::Upstream(format!("HTTP {}", status))),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinance {
    async fn chart(
        &self,
        symbol: &str,
        interval: &str,
        period1: DateTime<Utc>,
        period2: DateTime<Utc>,
    ) -> Result<ChartData, ProxyError> {
        let url = format!("{}/{}", self.chart_base_url, symbol);
        let request = self.client.get(&url).query(&[
            ("period1", period1.timestamp().to_string()),
            ("period2", period2.timestamp().to_string()),
            ("interval", interval.to_string()),
            ("events", "div|split".to_string()),
        ]);
        let envelope: ChartEnvelope = self.get_json(request).await?;
        parse_chart(envelope)
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, ProxyError> {
        let request = self
            .client
            .get(&self.search_base_url)
            .query(&[("q", query), ("lang", "en-US"), ("region", "US")]);
        let envelope: SearchEnvelope = self.get_json(request).await?;
        Ok(parse_search(envelope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_columns_become_records() {
        let raw = r#"{"chart":{"result":[{
            "meta":{"symbol":"AAPL","currency":"USD","exchangeName":"NMS","dataGranularity":"1d"},
            "timestamp":[1704205800,1704292200],
            "indicators":{
                "quote":[{"open":[187.15,null],"high":[188.44,185.88],"low":[183.89,183.43],"close":[185.64,184.25],"volume":[82488700,58414500]}],
                "adjclose":[{"adjclose":[184.94,183.56]}]
            }}],"error":null}}"#;
        let chart = parse_chart(serde_json::from_str(raw).unwrap()).unwrap();

        assert_eq!(chart.meta.symbol, "AAPL");
        assert_eq!(chart.meta.exchange_name.as_deref(), Some("NMS"));
        assert_eq!(chart.quotes.len(), 2);
        assert_eq!(chart.quotes[0].date.timestamp(), 1704205800);
        assert_eq!(chart.quotes[0].close, Some(185.64));
        assert_eq!(chart.quotes[1].open, None);
        assert_eq!(chart.quotes[1].adjclose, Some(183.56));
    }

    #[test]
    fn chart_error_is_reported() {
        let raw = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_chart(serde_json::from_str(raw).unwrap()).unwrap_err();
        assert!(err.to_string().contains("symbol may be delisted"));
    }

    #[test]
    fn search_skips_quotes_without_symbol() {
        let raw = r#"{"quotes":[{"symbol":"BP"},{"shortname":"news"},{"symbol":"BP.L"}]}"#;
        assert_eq!(parse_search(serde_json::from_str(raw).unwrap()), vec!["BP", "BP.L"]);
    }

    #[test]
    fn quotes_serialize_with_nulls() {
        let quote = Quote {
            date: DateTime::from_timestamp(0, 0).unwrap(),
            open: None,
            high: Some(1.0),
            low: Some(1.0),
            close: Some(1.0),
            volume: None,
            adjclose: None,
        };
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["date"], "1970-01-01T00:00:00Z");
        assert!(json["open"].is_null());
    }
}
