// Request routing. Every handler failure is a 500 with `{"error": ...}`.
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use url::form_urlencoded;

use shared::models::TimeFrame;
use shared::utils::parse_date;

use crate::config::ProxySettings;
use crate::error::ProxyError;
use crate::yahoo::MarketDataProvider;

pub struct AppContext {
    pub provider: Arc<dyn MarketDataProvider>,
    pub settings: ProxySettings,
}

#[derive(Debug, PartialEq)]
enum Route {
    FullChart(String),
    Chart(String),
    Search(String),
}

// percent-decodes one path segment; `=` and `+` are kept as-is
fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

fn match_route(method: &Method, path: &str) -> Option<Route> {
    if *method != Method::GET {
        return None;
    }
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    match segments.as_slice() {
        ["api", "stock", "chart", symbol] if !symbol.is_empty() => Some(Route::FullChart(decode_segment(symbol))),
        ["stock", "chart", symbol] if !symbol.is_empty() => Some(Route::Chart(decode_segment(symbol))),
        ["search-stocks", query] if !query.is_empty() => Some(Route::Search(decode_segment(query))),
        _ => None,
    }
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<Body> {
    let (status, body) = match serde_json::to_vec(value) {
        Ok(body) => (status, body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": e.to_string() }).to_string().into_bytes(),
        ),
    };
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, hyper::header::HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, hyper::header::HeaderValue::from_static("*"));
    response
}

fn query_params(req: &Request<Body>) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// 2014-01-01, start of the full daily chart.
fn full_chart_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).single().unwrap_or_default()
}

async fn full_chart(ctx: &AppContext, symbol: &str) -> Result<Response<Body>, ProxyError> {
    let chart = ctx
        .provider
        .chart(symbol, TimeFrame::Day1.yahoo_interval(), full_chart_start(), Utc::now())
        .await?;
    Ok(json_response(StatusCode::OK, &chart))
}

async fn chart(ctx: &AppContext, symbol: &str, params: &HashMap<String, String>) -> Result<Response<Body>, ProxyError> {
    let timeframe: TimeFrame = match params.get("timeframe") {
        Some(code) => code.parse()?,
        None => TimeFrame::default(),
    };
    let period1 = match params.get("period1") {
        Some(raw) => parse_date(raw)?,
        None => ctx.settings.history_floor,
    };
    let period2 = match params.get("period2") {
        Some(raw) => parse_date(raw)?,
        None => Utc::now(),
    };
    let period1 = period1.max(ctx.settings.history_floor);
    if period2 < period1 {
        return Err(ProxyError::InvalidRequest(format!("period2 {} is before period1 {}", period2, period1)));
    }

    debug!(%symbol, %timeframe, %period1, %period2, "Fetching chart");
    let chart = ctx
        .provider
        .chart(symbol, timeframe.yahoo_interval(), period1, period2)
        .await?;
    Ok(json_response(StatusCode::OK, &chart.quotes))
}

async fn search(ctx: &AppContext, query: &str) -> Result<Response<Body>, ProxyError> {
    let symbols = ctx.provider.search(query).await?;
    Ok(json_response(StatusCode::OK, &symbols))
}

pub async fn handle(req: Request<Body>, ctx: Arc<AppContext>) -> Result<Response<Body>, Infallible> {
    let path = req.uri().path().to_string();
    let Some(route) = match_route(req.method(), &path) else {
        debug!(method = %req.method(), %path, "No route");
        return Ok(json_response(StatusCode::NOT_FOUND, &serde_json::json!({ "error": "Not Found" })));
    };

    let params = query_params(&req);
    let result = match &route {
        Route::FullChart(symbol) => full_chart(&ctx, symbol).await,
        Route::Chart(symbol) => chart(&ctx, symbol, &params).await,
        Route::Search(query) => search(&ctx, query).await,
    };

    Ok(result.unwrap_or_else(|e| {
        error!(%path, error = %e, "Error fetching data");
        json_response(StatusCode::INTERNAL_SERVER_ERROR, &serde_json::json!({ "error": e.to_string() }))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yahoo::{ChartData, ChartMeta, Quote};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        fail: bool,
        requests: Mutex<Vec<(String, String, DateTime<Utc>, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl MarketDataProvider for FakeProvider {
        async fn chart(
            &self,
            symbol: &str,
            interval: &str,
            period1: DateTime<Utc>,
            period2: DateTime<Utc>,
        ) -> Result<ChartData, ProxyError> {
            if self.fail {
                return Err(ProxyError::Upstream("Not Found: No data found".to_string()));
            }
            self.requests
                .lock()
                .unwrap()
                .push((symbol.to_string(), interval.to_string(), period1, period2));
            Ok(ChartData {
                meta: ChartMeta {
                    symbol: symbol.to_string(),
                    ..ChartMeta::default()
                },
                quotes: vec![Quote {
                    date: period1,
                    open: Some(1.0),
                    high: Some(2.0),
                    low: Some(0.5),
                    close: Some(1.5),
                    volume: Some(100.0),
                    adjclose: None,
                }],
            })
        }

        async fn search(&self, query: &str) -> Result<Vec<String>, ProxyError> {
            if self.fail {
                return Err(ProxyError::Upstream("timeout".to_string()));
            }
            Ok(vec![query.to_uppercase()])
        }
    }

    fn context(provider: Arc<FakeProvider>) -> Arc<AppContext> {
        Arc::new(AppContext {
            provider,
            settings: ProxySettings::default(),
        })
    }

    async fn get(ctx: Arc<AppContext>, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = handle(req, ctx).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn routes_are_matched_by_segment() {
        assert_eq!(match_route(&Method::GET, "/stock/chart/AAPL"), Some(Route::Chart("AAPL".into())));
        assert_eq!(match_route(&Method::GET, "/api/stock/chart/%5EGSPC"), Some(Route::FullChart("^GSPC".into())));
        assert_eq!(match_route(&Method::GET, "/search-stocks/bp"), Some(Route::Search("bp".into())));
        assert_eq!(match_route(&Method::POST, "/search-stocks/bp"), None);
        assert_eq!(match_route(&Method::GET, "/stock/chart/"), None);
    }

    #[test]
    fn symbols_keep_equals_and_plus() {
        assert_eq!(match_route(&Method::GET, "/stock/chart/EURUSD=X"), Some(Route::Chart("EURUSD=X".into())));
        assert_eq!(match_route(&Method::GET, "/api/stock/chart/GC%3DF"), Some(Route::FullChart("GC=F".into())));
        assert_eq!(match_route(&Method::GET, "/search-stocks/a+b"), Some(Route::Search("a+b".into())));
        assert_eq!(match_route(&Method::GET, "/search-stocks/a%20b"), Some(Route::Search("a b".into())));
    }

    #[tokio::test]
    async fn chart_period1_is_clamped_to_the_floor() {
        let provider = Arc::new(FakeProvider::default());
        let (status, body) = get(
            context(provider.clone()),
            "/stock/chart/MSFT?timeframe=1WK&period1=1990-01-01T00:00:00Z&period2=2001-01-01T00:00:00Z",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_array());
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].1, "1wk");
        assert_eq!(requests[0].2.to_rfc3339(), "2000-01-01T00:00:00+00:00");
    }

    #[tokio::test]
    async fn full_chart_starts_in_2014() {
        let provider = Arc::new(FakeProvider::default());
        let (status, body) = get(context(provider.clone()), "/api/stock/chart/AAPL").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meta"]["symbol"], "AAPL");
        assert_eq!(body["quotes"].as_array().unwrap().len(), 1);
        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests[0].1, "1d");
        assert_eq!(requests[0].2, full_chart_start());
    }

    #[tokio::test]
    async fn search_returns_symbols() {
        let (status, body) = get(context(Arc::new(FakeProvider::default())), "/search-stocks/bp").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["BP"]));
    }

    #[tokio::test]
    async fn upstream_failure_is_a_500_with_message() {
        let provider = Arc::new(FakeProvider {
            fail: true,
            ..FakeProvider::default()
        });
        let (status, body) = get(context(provider), "/search-stocks/bp").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn bad_timeframe_is_a_500() {
        let (status, body) = get(context(Arc::new(FakeProvider::default())), "/stock/chart/AAPL?timeframe=2D").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("2D"));
    }

    #[tokio::test]
    async fn unknown_route_is_a_404() {
        let (status, _) = get(context(Arc::new(FakeProvider::default())), "/quotes/AAPL").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
