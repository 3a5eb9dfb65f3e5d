// Loads price history into the store: initial window on first use, then one
// window further back per extension, down to the 2000-01-01 floor.
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use shared::models::{Candle, DateRange, TimeFrame};
use shared::utils::history_floor;

use super::market_data::{window_start, MarketDataStore};
use super::quote_client::QuoteSource;
use crate::error::EngineError;

type SeriesKey = (String, TimeFrame);

pub struct HistoryLoader {
    store: Arc<RwLock<MarketDataStore>>,
    source: Arc<dyn QuoteSource>,
    // one lock per series so concurrent loads of the same key run one at a time
    locks: Mutex<HashMap<SeriesKey, Arc<Mutex<()>>>>,
}

impl HistoryLoader {
    pub fn new(store: Arc<RwLock<MarketDataStore>>, source: Arc<dyn QuoteSource>) -> Self {
        Self {
            store,
            source,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &Arc<dyn QuoteSource> {
        &self.source
    }

    async fn series_lock(&self, symbol: &str, timeframe: TimeFrame) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry((symbol.to_string(), timeframe))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the idle per-series locks of `symbol`. Locks a load is holding
    /// stay until that load finishes.
    pub async fn forget_locks(&self, symbol: &str) {
        let mut locks = self.locks.lock().await;
        locks.retain(|(s, _), lock| s != symbol || Arc::strong_count(lock) > 1);
        debug!(%symbol, remaining = locks.len(), "Released series locks");
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }

    async fn cached(&self, symbol: &str, timeframe: TimeFrame) -> Option<Vec<Candle>> {
        self.store.read().await.get_candles(symbol, timeframe, None, None)
    }

    /// Cached candles, loading the initial window on first use.
    pub async fn get_data(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, EngineError> {
        if let Some(candles) = self.cached(symbol, timeframe).await {
            return Ok(candles);
        }

        let lock = self.series_lock(symbol, timeframe).await;
        let _guard = lock.lock().await;
        // another caller may have loaded it while we waited
        if let Some(candles) = self.cached(symbol, timeframe).await {
            return Ok(candles);
        }

        let to = Utc::now();
        let from = window_start(timeframe, to);
        let candles = self.source.quotes(symbol, timeframe, from, to).await?;
        info!(%symbol, %timeframe, count = candles.len(), %from, "Loaded initial history");

        let mut store = self.store.write().await;
        store.add_candles(symbol, timeframe, from, to, candles);
        store
            .get_candles(symbol, timeframe, None, None)
            .ok_or_else(|| EngineError::MarketDataError(format!("Series not found for {} {}", symbol, timeframe)))
    }

    /// Reaches one window further back and returns the whole cached series.
    /// A failed extension is remembered and never retried.
    pub async fn extend_history(&self, symbol: &str, timeframe: TimeFrame) -> Result<Vec<Candle>, EngineError> {
        self.get_data(symbol, timeframe).await?;

        let lock = self.series_lock(symbol, timeframe).await;
        let _guard = lock.lock().await;

        let (current_from, exhausted, reaches_floor) = {
            let store = self.store.read().await;
            let series = store.get(symbol, timeframe).ok_or_else(|| {
                EngineError::MarketDataError(format!("Series not found for {} {}", symbol, timeframe))
            })?;
            (series.from, series.exhausted, series.reaches_floor())
        };

        if exhausted || reaches_floor {
            debug!(%symbol, %timeframe, exhausted, "No further history to load");
            return self.cached(symbol, timeframe).await.ok_or_else(|| {
                EngineError::MarketDataError(format!("Series not found for {} {}", symbol, timeframe))
            });
        }

        let new_from = window_start(timeframe, current_from);
        match self.source.quotes(symbol, timeframe, new_from, current_from).await {
            Ok(candles) => {
                info!(%symbol, %timeframe, count = candles.len(), from = %new_from, "Extended history");
                let mut store = self.store.write().await;
                store.add_candles(symbol, timeframe, new_from, current_from, candles);
            }
            Err(e) => {
                warn!(%symbol, %timeframe, error = %e, "History extension failed, not retrying");
                self.store.write().await.mark_exhausted(symbol, timeframe);
            }
        }

        self.cached(symbol, timeframe)
            .await
            .ok_or_else(|| EngineError::MarketDataError(format!("Series not found for {} {}", symbol, timeframe)))
    }

    /// Exactly the requested window, straight from the source; never cached.
    pub async fn fetch_window(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Candle>, EngineError> {
        if to < from {
            return Err(EngineError::InvalidArgument(format!("period2 {} is before period1 {}", to, from)));
        }
        self.source.quotes(symbol, timeframe, from.max(history_floor()), to).await
    }

    pub async fn range(&self, symbol: &str, timeframe: TimeFrame) -> Result<DateRange, EngineError> {
        self.get_data(symbol, timeframe).await?;
        self.store
            .read()
            .await
            .range(symbol, timeframe)
            .ok_or_else(|| EngineError::MarketDataError(format!("Series not found for {} {}", symbol, timeframe)))
    }
}
