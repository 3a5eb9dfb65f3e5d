// In-memory chart surface. The GUI renders from it; tests inspect it.
use std::collections::{BTreeMap, BTreeSet};

use shared::models::Candle;

use crate::error::ChartError;
use crate::layout::{ScaleId, ScaleMargins};
use crate::surface::{CandlePoint, ChartPoint, ChartSurface, SeriesHandle, SeriesKind, SubscriptionId};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLayer {
    pub handle: SeriesHandle,
    pub kind: SeriesKind,
    pub scale: ScaleId,
    pub color: String,
    pub points: Vec<ChartPoint>,
}

/// Visible time window in chart time (UNIX seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ChartScene {
    candles: Vec<CandlePoint>,
    layers: Vec<SeriesLayer>,
    margins: BTreeMap<ScaleId, ScaleMargins>,
    visible_range: Option<VisibleRange>,
    subscribers: BTreeSet<SubscriptionId>,
    next_handle: u64,
    next_subscription: u64,
}

impl ChartScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn candles(&self) -> &[CandlePoint] {
        &self.candles
    }

    /// Layers in z-order, bottom first.
    pub fn layers(&self) -> &[SeriesLayer] {
        &self.layers
    }

    pub fn layer(&self, handle: SeriesHandle) -> Option<&SeriesLayer> {
        self.layers.iter().find(|layer| layer.handle == handle)
    }

    pub fn margins(&self, scale: ScaleId) -> Option<ScaleMargins> {
        self.margins.get(&scale).copied()
    }

    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible_range
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Time span of the loaded candles.
    pub fn data_range(&self) -> Option<VisibleRange> {
        match (self.candles.first(), self.candles.last()) {
            (Some(first), Some(last)) => Some(VisibleRange { from: first.time, to: last.time }),
            _ => None,
        }
    }

    /// Moves the viewport and returns the subscriptions that must be told.
    pub fn set_visible_range(&mut self, range: VisibleRange) -> Vec<SubscriptionId> {
        if self.visible_range == Some(range) {
            return Vec::new();
        }
        self.visible_range = Some(range);
        self.subscribers.iter().copied().collect()
    }

    /// Shows the whole data range.
    pub fn fit_content(&mut self) {
        self.visible_range = self.data_range();
    }
}

impl ChartSurface for ChartScene {
    fn set_price_data(&mut self, candles: &[Candle]) {
        self.candles = candles.iter().map(CandlePoint::from).collect();
        if self.visible_range.is_none() {
            self.fit_content();
        }
    }

    fn add_series(&mut self, kind: SeriesKind, scale: ScaleId, color: &str) -> SeriesHandle {
        self.next_handle += 1;
        let handle = SeriesHandle(self.next_handle);
        self.layers.push(SeriesLayer {
            handle,
            kind,
            scale,
            color: color.to_string(),
            points: Vec::new(),
        });
        handle
    }

    fn set_series_data(&mut self, handle: SeriesHandle, points: Vec<ChartPoint>) -> Result<(), ChartError> {
        let layer = self
            .layers
            .iter_mut()
            .find(|layer| layer.handle == handle)
            .ok_or(ChartError::UnknownSeries(handle))?;
        layer.points = points;
        Ok(())
    }

    fn remove_series(&mut self, handle: SeriesHandle) -> Result<(), ChartError> {
        let index = self
            .layers
            .iter()
            .position(|layer| layer.handle == handle)
            .ok_or(ChartError::UnknownSeries(handle))?;
        self.layers.remove(index);
        Ok(())
    }

    fn apply_scale_margins(&mut self, scale: ScaleId, margins: ScaleMargins) {
        self.margins.insert(scale, margins);
    }

    fn subscribe_visible_range(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscribers.insert(id);
        id
    }

    fn unsubscribe_visible_range(&mut self, id: SubscriptionId) {
        self.subscribers.remove(&id);
    }
}
