// Drives the registry, the viewport loader and the stores against a
// `DataFetch` backend. One controller per chart.
use chrono::Utc;
use tracing::{debug, error, info, warn};

use shared::models::{StrategyResult, TimeFrame};
use shared::Indicator;

use crate::error::ChartError;
use crate::fetch::{BacktestParams, DataFetch};
use crate::registry::{ChartContext, IndicatorRegistry, IndicatorRequest, OverlayPalette};
use crate::scene::{ChartScene, VisibleRange};
use crate::stores::{BacktestStore, SearchStore, TimeframeStore, WatchlistStore};
use crate::surface::ChartSurface;
use crate::viewport::{chart_time_to_ms, ViewportLoader};

/// Everything a view needs to draw one frame.
#[derive(Debug, Clone, Default)]
pub struct ChartSnapshot {
    pub scene: ChartScene,
    pub watchlist: WatchlistStore,
    pub timeframe: TimeframeStore,
    pub search: SearchStore,
    pub backtest: BacktestStore,
    pub backtest_result: Option<StrategyResult>,
    pub active_indicators: Vec<Indicator>,
    pub last_error: Option<String>,
}

pub struct ChartController<F: DataFetch> {
    fetch: F,
    registry: IndicatorRegistry,
    loader: ViewportLoader,
    scene: ChartScene,
    watchlist: WatchlistStore,
    timeframe: TimeframeStore,
    search: SearchStore,
    backtest: BacktestStore,
    backtest_result: Option<StrategyResult>,
    last_error: Option<String>,
}

impl<F: DataFetch> ChartController<F> {
    pub fn new(fetch: F, palette: OverlayPalette) -> Self {
        Self {
            fetch,
            registry: IndicatorRegistry::with_palette(palette),
            loader: ViewportLoader::new(),
            scene: ChartScene::new(),
            watchlist: WatchlistStore::default(),
            timeframe: TimeframeStore::default(),
            search: SearchStore::default(),
            backtest: BacktestStore::default(),
            backtest_result: None,
            last_error: None,
        }
    }

    /// The context currently on the chart. It only changes once price data
    /// for a new symbol or timeframe has loaded.
    pub fn context(&self) -> Option<ChartContext> {
        self.loader.context().cloned()
    }

    fn selected_context(&self) -> Option<ChartContext> {
        self.watchlist
            .selected()
            .map(|symbol| ChartContext::new(symbol, self.timeframe.timeframe()))
    }

    pub async fn select_symbol(&mut self, symbol: &str) -> Result<(), ChartError> {
        let target = ChartContext::new(symbol, self.timeframe.timeframe());
        if self.context().as_ref() != Some(&target) {
            self.load(target).await?;
        }
        self.watchlist.set_label(symbol);
        Ok(())
    }

    pub async fn select_timeframe(&mut self, timeframe: TimeFrame) -> Result<(), ChartError> {
        if self.timeframe.timeframe() == timeframe {
            return Ok(());
        }
        if let Some(symbol) = self.watchlist.selected() {
            let target = ChartContext::new(symbol, timeframe);
            self.load(target).await?;
        }
        self.timeframe.set_timeframe(timeframe, Utc::now());
        Ok(())
    }

    /// Charts the watchlist selection. When it cannot be loaded the chart is
    /// cleared rather than left on another symbol.
    pub async fn reload(&mut self) -> Result<(), ChartError> {
        let Some(context) = self.selected_context() else {
            self.clear_chart();
            return Ok(());
        };
        if let Err(e) = self.load(context).await {
            self.clear_chart();
            return Err(e);
        }
        Ok(())
    }

    /// Loads price data for `context`, re-attaches the viewport loader and
    /// refetches every indicator. Nothing changes when the price fetch fails.
    async fn load(&mut self, context: ChartContext) -> Result<(), ChartError> {
        info!(symbol = %context.symbol, timeframe = %context.timeframe, "Loading chart");
        let candles = match self.fetch.get_data(&context.symbol, context.timeframe).await {
            Ok(candles) => candles,
            Err(e) => {
                error!(symbol = %context.symbol, error = %e, "Failed to load price data");
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };
        self.last_error = None;

        self.scene.set_price_data(&candles);
        self.scene.fit_content();
        self.loader.subscribe(&mut self.scene, context.clone());

        let requests = self.registry.reconcile_on_context_change(&context);
        self.run_indicator_requests(requests).await;
        self.registry.materialize_overlays(&mut self.scene);
        Ok(())
    }

    fn clear_chart(&mut self) {
        self.loader.unsubscribe(&mut self.scene);
        self.scene.set_price_data(&[]);
        self.scene.fit_content();
    }

    pub async fn add_indicator(&mut self, indicator: Indicator) -> Result<(), ChartError> {
        let context = self.context().ok_or(ChartError::NoSymbolSelected)?;
        if let Some(request) = self.registry.add_indicator(&context, indicator) {
            self.run_indicator_requests(vec![request]).await;
        }
        self.registry.materialize_overlays(&mut self.scene);
        Ok(())
    }

    pub fn remove_indicator(&mut self, indicator: &Indicator) {
        self.registry.remove_indicator(indicator);
        self.registry.materialize_overlays(&mut self.scene);
    }

    pub async fn toggle_indicator(&mut self, indicator: Indicator) -> Result<(), ChartError> {
        if self.registry.is_active(&indicator) {
            self.remove_indicator(&indicator);
            Ok(())
        } else {
            self.add_indicator(indicator).await
        }
    }

    /// Moves the viewport and loads older history when it nears the cached
    /// edge. Returns true when new history was loaded.
    pub async fn pan(&mut self, range: VisibleRange) -> Result<bool, ChartError> {
        let notified = self.scene.set_visible_range(range);
        let Some(subscription) = self.loader.subscription() else {
            return Ok(false);
        };
        if !notified.contains(&subscription) {
            return Ok(false);
        }
        let Some(query) = self.loader.on_visible_range_change(chart_time_to_ms(range.from)) else {
            return Ok(false);
        };

        let cached = match self.fetch.get_range(&query.context.symbol, query.context.timeframe).await {
            Ok(cached) => cached,
            Err(e) => {
                self.loader.on_failure(query.ticket, &e);
                return Err(e.into());
            }
        };
        let Some(request) = self.loader.on_range(&query, cached) else {
            return Ok(false);
        };

        let candles = match self
            .fetch
            .fetch_stock_chart(&request.context.symbol, request.context.timeframe, None, None)
            .await
        {
            Ok(candles) => candles,
            Err(e) => {
                self.loader.on_failure(request.ticket, &e);
                return Err(e.into());
            }
        };
        if !self.loader.on_history(&request, &candles, &mut self.scene) {
            return Ok(false);
        }

        // indicators were computed on the shorter history
        let requests = self.registry.reconcile_on_context_change(&request.context);
        self.run_indicator_requests(requests).await;
        self.registry.materialize_overlays(&mut self.scene);
        Ok(true)
    }

    pub async fn search(&mut self, query: &str) {
        let Some(query) = self.search.set_query(query) else {
            return;
        };
        match self.fetch.search_indices(&query).await {
            Ok(results) => {
                debug!(query = %query, count = results.len(), "Search results");
                self.search.set_results(&query, results);
            }
            Err(e) => self.search.fail(&query, &e),
        }
    }

    pub fn close_search(&mut self) {
        self.search.close();
    }

    pub async fn add_to_watchlist(&mut self, label: &str) -> Result<(), ChartError> {
        if let Err(e) = self.fetch.add_item(label).await {
            warn!(label = %label, error = %e, "Failed to persist watchlist entry");
            self.last_error = Some(e.to_string());
            return Err(e.into());
        }
        self.search.clear();
        self.watchlist.add_label(label);
        self.select_symbol(label).await
    }

    pub async fn remove_from_watchlist(&mut self, label: &str) -> Result<(), ChartError> {
        if let Err(e) = self.fetch.delete_label(label).await {
            warn!(label = %label, error = %e, "Failed to delete watchlist entry");
            self.last_error = Some(e.to_string());
            return Err(e.into());
        }
        self.watchlist.remove_label(label);
        if self.context() != self.selected_context() {
            self.reload().await?;
        }
        Ok(())
    }

    /// Pulls the persisted watchlist and charts its selection.
    pub async fn refresh_labels(&mut self) -> Result<(), ChartError> {
        let labels = self.fetch.get_labels().await?;
        self.watchlist.replace_labels(labels);
        if self.context() != self.selected_context() {
            self.reload().await?;
        }
        Ok(())
    }

    pub async fn run_backtest(&mut self) -> Result<(), ChartError> {
        if !self.backtest.is_valid_date_range() {
            return Err(ChartError::InvalidDateRange);
        }
        let context = self.context().ok_or(ChartError::NoSymbolSelected)?;
        let strategy = self.backtest.strategy();
        let params = BacktestParams {
            symbol: context.symbol,
            timeframe: context.timeframe,
            from: self.backtest.from(),
            to: self.backtest.to(),
            periods: strategy.default_periods(),
        };

        info!(symbol = %params.symbol, %strategy, "Running backtest");
        match self.fetch.run_strategy(strategy, params).await {
            Ok(result) => {
                self.backtest_result = Some(result);
                Ok(())
            }
            Err(e) => {
                error!(%strategy, error = %e, "Backtest failed");
                self.backtest_result = None;
                self.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    async fn run_indicator_requests(&mut self, requests: Vec<IndicatorRequest>) {
        for request in requests {
            let result = self
                .fetch
                .get_indicators(&request.context.symbol, request.context.timeframe, request.indicator)
                .await;
            self.registry.apply_fetch(&request, result);
        }
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            scene: self.scene.clone(),
            watchlist: self.watchlist.clone(),
            timeframe: self.timeframe.clone(),
            search: self.search.clone(),
            backtest: self.backtest.clone(),
            backtest_result: self.backtest_result.clone(),
            active_indicators: self.registry.active_keys().copied().collect(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn scene(&self) -> &ChartScene {
        &self.scene
    }

    pub fn registry(&self) -> &IndicatorRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &ViewportLoader {
        &self.loader
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn timeframe(&self) -> &TimeframeStore {
        &self.timeframe
    }

    pub fn search_state(&self) -> &SearchStore {
        &self.search
    }

    pub fn backtest(&self) -> &BacktestStore {
        &self.backtest
    }

    pub fn backtest_mut(&mut self) -> &mut BacktestStore {
        &mut self.backtest
    }

    pub fn backtest_result(&self) -> Option<&StrategyResult> {
        self.backtest_result.as_ref()
    }

    pub fn fetch(&self) -> &F {
        &self.fetch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone};
    use shared::models::{Candle, DateRange, IndicatorSeries, SeriesPoint, Strategy, TradeSignal};
    use shared::utils::format_day;

    use crate::error::FetchError;

    #[derive(Default)]
    struct FakeFetch {
        indicator_calls: Mutex<Vec<(String, TimeFrame, Indicator)>>,
        history_calls: Mutex<u32>,
        labels: Mutex<Vec<String>>,
        cached_from: Mutex<Option<DateTime<Utc>>>,
        data_calls: Mutex<Vec<String>>,
        fail_search: bool,
        unavailable: Option<&'static str>,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    fn candles(from: DateTime<Utc>, days: i64) -> Vec<Candle> {
        (0..days)
            .map(|i| Candle {
                time: from + Duration::days(i),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.5,
                volume: 1_000.0,
            })
            .collect()
    }

    impl FakeFetch {
        fn indicator_calls(&self) -> Vec<(String, TimeFrame, Indicator)> {
            self.indicator_calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DataFetch for FakeFetch {
        async fn fetch_stock_chart(
            &self,
            _symbol: &str,
            _timeframe: TimeFrame,
            _period1: Option<DateTime<Utc>>,
            _period2: Option<DateTime<Utc>>,
        ) -> Result<Vec<Candle>, FetchError> {
            *self.history_calls.lock().unwrap() += 1;
            let from = start() - Duration::days(365);
            *self.cached_from.lock().unwrap() = Some(from);
            Ok(candles(from, 730))
        }

        async fn get_data(&self, symbol: &str, _timeframe: TimeFrame) -> Result<Vec<Candle>, FetchError> {
            self.data_calls.lock().unwrap().push(symbol.to_string());
            if self.unavailable == Some(symbol) {
                return Err(FetchError::Remote(format!("No data for {symbol}")));
            }
            Ok(candles(start(), 365))
        }

        async fn get_range(&self, _symbol: &str, _timeframe: TimeFrame) -> Result<DateRange, FetchError> {
            let from = self.cached_from.lock().unwrap().unwrap_or_else(start);
            Ok(DateRange {
                from,
                to: start() + Duration::days(364),
            })
        }

        async fn get_indicators(
            &self,
            symbol: &str,
            timeframe: TimeFrame,
            indicator: Indicator,
        ) -> Result<IndicatorSeries, FetchError> {
            self.indicator_calls
                .lock()
                .unwrap()
                .push((symbol.to_string(), timeframe, indicator));
            let line: Vec<SeriesPoint> = candles(start(), 5)
                .iter()
                .map(|c| SeriesPoint {
                    time: format_day(&c.time),
                    value: c.close,
                })
                .collect();
            Ok(IndicatorSeries::new(vec![line; indicator.series_count()]))
        }

        async fn search_indices(&self, query: &str) -> Result<Vec<String>, FetchError> {
            if self.fail_search {
                return Err(FetchError::Transport("proxy down".into()));
            }
            Ok(vec![query.to_uppercase()])
        }

        async fn add_item(&self, item: &str) -> Result<(), FetchError> {
            self.labels.lock().unwrap().push(item.to_string());
            Ok(())
        }

        async fn delete_label(&self, label: &str) -> Result<(), FetchError> {
            self.labels.lock().unwrap().retain(|l| l != label);
            Ok(())
        }

        async fn get_labels(&self) -> Result<Vec<String>, FetchError> {
            Ok(self.labels.lock().unwrap().clone())
        }

        async fn run_strategy(&self, _strategy: Strategy, params: BacktestParams) -> Result<StrategyResult, FetchError> {
            Ok(StrategyResult {
                signals: vec![TradeSignal::Buy, TradeSignal::Sell],
                dates: vec![format_day(&params.from), format_day(&params.to)],
                num_trades: 1,
                winning_trades: 1,
                losing_trades: 0,
                winning_percentage: 100.0,
                profit_factor: 0.0,
                final_capital: 100_010.0,
                total_return_percentage: 0.01,
            })
        }
    }

    async fn charting(symbol: &str, fetch: FakeFetch) -> ChartController<FakeFetch> {
        let mut controller = ChartController::new(fetch, OverlayPalette::default());
        controller.select_symbol(symbol).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn timeframe_change_refetches_active_indicators_once_each() {
        let mut controller = charting("AAPL", FakeFetch::default()).await;
        controller.add_indicator(Indicator::Ema(21)).await.unwrap();
        controller.add_indicator(Indicator::Rsi(14)).await.unwrap();
        controller.add_indicator(Indicator::Rsi(14)).await.unwrap();
        assert_eq!(controller.fetch().indicator_calls().len(), 2);

        controller.select_timeframe(TimeFrame::Hour1).await.unwrap();

        let calls = controller.fetch().indicator_calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[2..].iter().all(|(s, tf, _)| s == "AAPL" && *tf == TimeFrame::Hour1));
        assert_eq!(controller.registry().active_keys().count(), 2);
        assert_eq!(controller.scene().layers().len(), 2);
    }

    #[tokio::test]
    async fn symbol_switch_keeps_one_viewport_subscription() {
        let mut controller = charting("AAPL", FakeFetch::default()).await;
        controller.add_indicator(Indicator::Macd { short: 12, long: 26, signal: 9 }).await.unwrap();
        controller.select_symbol("MSFT").await.unwrap();

        assert_eq!(controller.scene().subscriber_count(), 1);
        assert_eq!(controller.scene().layers().len(), 3);
        assert_eq!(controller.context().unwrap().symbol, "MSFT");
    }

    #[tokio::test]
    async fn failed_symbol_switch_keeps_the_charted_symbol() {
        let fetch = FakeFetch {
            unavailable: Some("BAD"),
            ..FakeFetch::default()
        };
        let mut controller = charting("AAPL", fetch).await;
        controller.add_indicator(Indicator::Sma(5)).await.unwrap();

        assert!(controller.select_symbol("BAD").await.is_err());
        assert_eq!(controller.watchlist().selected(), Some("AAPL"));
        assert_eq!(controller.context().unwrap().symbol, "AAPL");
        assert_eq!(controller.scene().candles().len(), 365);
        assert!(controller.snapshot().last_error.is_some());

        controller.add_indicator(Indicator::Ema(8)).await.unwrap();
        assert!(controller.fetch().indicator_calls().iter().all(|(s, _, _)| s == "AAPL"));

        // selecting it again retries the load
        assert!(controller.select_symbol("BAD").await.is_err());
        assert_eq!(*controller.fetch().data_calls.lock().unwrap(), ["AAPL", "BAD", "BAD"]);
    }

    #[tokio::test]
    async fn failed_timeframe_switch_keeps_the_charted_timeframe() {
        let fetch = FakeFetch {
            unavailable: Some("AAPL"),
            ..FakeFetch::default()
        };
        let mut controller = ChartController::new(fetch, OverlayPalette::default());
        controller.watchlist.set_label("AAPL");

        assert!(controller.select_timeframe(TimeFrame::Hour1).await.is_err());
        assert_eq!(controller.timeframe().timeframe(), TimeFrame::default());
        assert_eq!(controller.context(), None);
    }

    #[tokio::test]
    async fn unloadable_fallback_symbol_clears_the_chart() {
        let fetch = FakeFetch {
            unavailable: Some("BAD"),
            ..FakeFetch::default()
        };
        let mut controller = charting("AAPL", fetch).await;
        assert!(controller.add_to_watchlist("BAD").await.is_err());
        assert_eq!(controller.watchlist().labels(), ["AAPL", "BAD"]);
        assert_eq!(controller.watchlist().selected(), Some("AAPL"));

        assert!(controller.remove_from_watchlist("AAPL").await.is_err());
        assert_eq!(controller.watchlist().selected(), Some("BAD"));
        assert_eq!(controller.context(), None);
        assert!(controller.scene().candles().is_empty());
        assert_eq!(
            controller.add_indicator(Indicator::Ema(8)).await,
            Err(ChartError::NoSymbolSelected)
        );
    }

    #[tokio::test]
    async fn removing_an_indicator_tears_down_its_layers() {
        let mut controller = charting("AAPL", FakeFetch::default()).await;
        controller.add_indicator(Indicator::Volume).await.unwrap();
        assert_eq!(controller.scene().layers().len(), 1);

        controller.remove_indicator(&Indicator::Volume);
        assert!(controller.scene().layers().is_empty());
        assert!(controller.registry().pending_teardown().is_empty());
    }

    #[tokio::test]
    async fn panning_to_the_cached_edge_loads_history() {
        let mut controller = charting("AAPL", FakeFetch::default()).await;
        controller.add_indicator(Indicator::Sma(5)).await.unwrap();

        let far = VisibleRange {
            from: (start() + Duration::days(200)).timestamp(),
            to: (start() + Duration::days(300)).timestamp(),
        };
        assert!(!controller.pan(far).await.unwrap());

        let near = VisibleRange {
            from: (start() + Duration::days(10)).timestamp(),
            to: (start() + Duration::days(100)).timestamp(),
        };
        assert!(controller.pan(near).await.unwrap());
        assert_eq!(*controller.fetch().history_calls.lock().unwrap(), 1);
        assert_eq!(controller.scene().candles().len(), 730);
        assert_eq!(controller.scene().layers().len(), 1);
    }

    #[tokio::test]
    async fn search_failure_closes_dropdown() {
        let fetch = FakeFetch {
            fail_search: true,
            ..FakeFetch::default()
        };
        let mut controller = ChartController::new(fetch, OverlayPalette::default());
        controller.search("tsla").await;
        assert!(!controller.search_state().is_open());
        assert!(controller.search_state().results().is_empty());
    }

    #[tokio::test]
    async fn watchlist_changes_go_through_the_backend() {
        let mut controller = ChartController::new(FakeFetch::default(), OverlayPalette::default());
        controller.search("goog").await;
        assert_eq!(controller.search_state().results(), ["GOOG"]);

        controller.add_to_watchlist("GOOG").await.unwrap();
        assert_eq!(controller.watchlist().selected(), Some("GOOG"));
        assert!(controller.search_state().results().is_empty());
        assert_eq!(controller.scene().candles().len(), 365);

        controller.remove_from_watchlist("GOOG").await.unwrap();
        assert_eq!(controller.fetch().get_labels().await.unwrap(), Vec::<String>::new());
        assert_eq!(controller.watchlist().selected(), None);
        assert!(controller.scene().candles().is_empty());
    }

    #[tokio::test]
    async fn backtest_refuses_short_ranges() {
        let mut controller = charting("AAPL", FakeFetch::default()).await;
        controller
            .backtest_mut()
            .set_to(Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(controller.run_backtest().await, Err(ChartError::InvalidDateRange));

        controller
            .backtest_mut()
            .set_to(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        controller.run_backtest().await.unwrap();
        assert_eq!(controller.backtest_result().unwrap().num_trades, 1);
    }

    #[tokio::test]
    async fn indicators_need_a_symbol() {
        let mut controller = ChartController::new(FakeFetch::default(), OverlayPalette::default());
        assert_eq!(
            controller.add_indicator(Indicator::Ema(8)).await,
            Err(ChartError::NoSymbolSelected)
        );
    }
}
