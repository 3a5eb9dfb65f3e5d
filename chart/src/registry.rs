// Indicator registry: which overlays are active for the current symbol and
// timeframe, which fetches are outstanding, and which chart layers exist.
//
// The registry never performs I/O. Operations that need data return an
// `IndicatorRequest`; the caller runs it and feeds the result back through
// `apply_fetch`. Every request carries the context generation it was issued
// under, and results from an older generation are dropped.
use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use shared::models::{IndicatorSeries, TimeFrame};
use shared::utils::chart_time;
use shared::{Indicator, IndicatorFamily};

use crate::error::FetchError;
use crate::layout::{ScaleAllocation, ScaleId};
use crate::surface::{ChartPoint, ChartSurface, SeriesHandle, SeriesKind};

/// The (symbol, timeframe) pair indicator data is fetched against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChartContext {
    pub symbol: String,
    pub timeframe: TimeFrame,
}

impl ChartContext {
    pub fn new(symbol: impl Into<String>, timeframe: TimeFrame) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
        }
    }
}

/// A fetch the caller must issue on the registry's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRequest {
    pub context: ChartContext,
    pub indicator: Indicator,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Series stored; the next layout pass will draw it.
    Applied,
    /// Issued under an older context, or the key was removed meanwhile.
    Stale,
    Failed,
    /// Wrong number of lines for the indicator's family.
    Rejected,
}

/// Line colours per overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPalette {
    pub sma: String,
    pub ema: String,
    pub rsi: String,
    pub macd_line: String,
    pub signal_line: String,
    pub macd_histogram: String,
    pub volume: String,
}

impl Default for OverlayPalette {
    fn default() -> Self {
        Self {
            sma: "#ff6464".to_string(),
            ema: "#6464ff".to_string(),
            rsi: "#64ff64".to_string(),
            macd_line: "#855085".to_string(),
            signal_line: "#b9b964".to_string(),
            macd_histogram: "#64ffff".to_string(),
            volume: "#26a69a".to_string(),
        }
    }
}

impl OverlayPalette {
    /// Layers to create for one indicator, one per line it produces.
    fn layers_for(&self, indicator: &Indicator) -> Vec<(SeriesKind, ScaleId, &str)> {
        match indicator {
            Indicator::Sma(_) => vec![(SeriesKind::Line, ScaleId::Ma, self.sma.as_str())],
            Indicator::Ema(_) => vec![(SeriesKind::Line, ScaleId::Ma, self.ema.as_str())],
            Indicator::Rsi(_) => vec![(SeriesKind::Line, ScaleId::Rsi, self.rsi.as_str())],
            Indicator::Macd { .. } => vec![
                (SeriesKind::Line, ScaleId::MacdLine, self.macd_line.as_str()),
                (SeriesKind::Line, ScaleId::SignalLine, self.signal_line.as_str()),
                (SeriesKind::Histogram, ScaleId::MacdHistogram, self.macd_histogram.as_str()),
            ],
            Indicator::Volume => vec![(SeriesKind::Histogram, ScaleId::Volume, self.volume.as_str())],
        }
    }
}

#[derive(Debug, Default)]
pub struct IndicatorRegistry {
    active: IndexMap<Indicator, IndicatorSeries>,
    rendered: HashMap<Indicator, Vec<SeriesHandle>>,
    pending_teardown: Vec<SeriesHandle>,
    in_flight: IndexMap<Indicator, u64>,
    generation: u64,
    palette: OverlayPalette,
}

impl IndicatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: OverlayPalette) -> Self {
        Self {
            palette,
            ..Self::default()
        }
    }

    /// Returns the fetch to issue, or `None` when the key is already active
    /// or already being fetched for the current context.
    pub fn add_indicator(&mut self, context: &ChartContext, indicator: Indicator) -> Option<IndicatorRequest> {
        if self.active.contains_key(&indicator) {
            debug!(key = %indicator, "Indicator already active");
            return None;
        }
        if self.in_flight.get(&indicator) == Some(&self.generation) {
            debug!(key = %indicator, "Indicator fetch already in flight");
            return None;
        }

        self.in_flight.insert(indicator, self.generation);
        debug!(
            key = %indicator,
            symbol = %context.symbol,
            timeframe = %context.timeframe,
            generation = self.generation,
            "Requesting indicator series"
        );
        Some(IndicatorRequest {
            context: context.clone(),
            indicator,
            generation: self.generation,
        })
    }

    pub fn apply_fetch(
        &mut self,
        request: &IndicatorRequest,
        result: Result<IndicatorSeries, FetchError>,
    ) -> FetchOutcome {
        let key = request.indicator;
        let current = request.generation == self.generation
            && self.in_flight.get(&key) == Some(&request.generation);
        if !current {
            warn!(
                key = %key,
                symbol = %request.context.symbol,
                request_generation = request.generation,
                generation = self.generation,
                "Discarding stale indicator response"
            );
            return FetchOutcome::Stale;
        }
        self.in_flight.shift_remove(&key);

        let series = match result {
            Ok(series) => series,
            Err(e) => {
                warn!(key = %key, symbol = %request.context.symbol, error = %e, "Indicator fetch failed");
                return FetchOutcome::Failed;
            }
        };
        if series.line_count() != key.series_count() {
            warn!(
                key = %key,
                expected = key.series_count(),
                found = series.line_count(),
                "Indicator response has the wrong number of lines"
            );
            return FetchOutcome::Rejected;
        }

        info!(key = %key, symbol = %request.context.symbol, "Indicator added");
        self.active.insert(key, series);
        FetchOutcome::Applied
    }

    pub fn remove_indicator(&mut self, indicator: &Indicator) {
        let was_active = self.active.shift_remove(indicator).is_some();
        let was_in_flight = self.in_flight.shift_remove(indicator).is_some();
        if let Some(handles) = self.rendered.remove(indicator) {
            self.pending_teardown.extend(handles);
        }
        if was_active || was_in_flight {
            debug!(key = %indicator, "Indicator removed");
        }
    }

    /// Re-issues every active or outstanding indicator against `context`.
    pub fn reconcile_on_context_change(&mut self, context: &ChartContext) -> Vec<IndicatorRequest> {
        self.generation += 1;

        let mut keys: Vec<Indicator> = self.active.keys().copied().collect();
        for key in self.in_flight.keys() {
            if !keys.contains(key) {
                keys.push(*key);
            }
        }
        info!(
            symbol = %context.symbol,
            timeframe = %context.timeframe,
            generation = self.generation,
            count = keys.len(),
            "Reconciling indicators for new context"
        );

        keys.into_iter()
            .filter_map(|key| {
                self.remove_indicator(&key);
                self.add_indicator(context, key)
            })
            .collect()
    }

    /// Draws every active indicator that has no layers yet, tears down
    /// removed layers and applies the scale layout for the active families.
    pub fn materialize_overlays<S: ChartSurface + ?Sized>(&mut self, surface: &mut S) -> ScaleAllocation {
        for (key, series) in &self.active {
            if self.rendered.contains_key(key) {
                continue;
            }
            let mut handles = Vec::with_capacity(key.series_count());
            for ((kind, scale, color), line) in self.palette.layers_for(key).into_iter().zip(&series.lines) {
                let handle = surface.add_series(kind, scale, color);
                let points = line
                    .iter()
                    .map(|point| ChartPoint {
                        time: chart_time(&point.time),
                        value: point.value,
                    })
                    .collect();
                if let Err(e) = surface.set_series_data(handle, points) {
                    error!(key = %key, error = %e, "Failed to attach indicator data");
                }
                handles.push(handle);
            }
            debug!(key = %key, layers = handles.len(), "Overlay rendered");
            self.rendered.insert(*key, handles);
        }

        for handle in self.pending_teardown.drain(..) {
            if let Err(e) = surface.remove_series(handle) {
                warn!(?handle, error = %e, "Overlay layer already gone");
            }
        }

        let layout = ScaleAllocation::compute(self.active_families());
        layout.apply(surface);
        layout
    }

    pub fn active_keys(&self) -> impl Iterator<Item = &Indicator> {
        self.active.keys()
    }

    pub fn is_active(&self, indicator: &Indicator) -> bool {
        self.active.contains_key(indicator)
    }

    pub fn is_in_flight(&self, indicator: &Indicator) -> bool {
        self.in_flight.contains_key(indicator)
    }

    pub fn series(&self, indicator: &Indicator) -> Option<&IndicatorSeries> {
        self.active.get(indicator)
    }

    pub fn overlay(&self, indicator: &Indicator) -> Option<&[SeriesHandle]> {
        self.rendered.get(indicator).map(Vec::as_slice)
    }

    pub fn overlay_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn pending_teardown(&self) -> &[SeriesHandle] {
        &self.pending_teardown
    }

    pub fn in_flight(&self) -> impl Iterator<Item = &Indicator> {
        self.in_flight.keys()
    }

    pub fn active_families(&self) -> Vec<IndicatorFamily> {
        let mut families: Vec<IndicatorFamily> = Vec::new();
        for key in self.active.keys() {
            let family = key.family();
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
