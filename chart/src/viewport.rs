// Loads older price history when the user pans close to the left edge of
// what has been cached.
//
//   Idle --range change--> CheckingBoundary --near edge--> Fetching --history--> Idle
//                                  |                          |
//                                  +--- floor / far ----------+--- failure ---> Idle
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use shared::models::{Candle, DateRange, TimeFrame};
use shared::utils::boundary_floor;

use crate::registry::ChartContext;
use crate::surface::{ChartSurface, SubscriptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    CheckingBoundary,
    Fetching,
}

/// Ask the backend for the cached range of `context`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    pub context: ChartContext,
    pub visible_from_ms: i64,
    pub ticket: u64,
}

/// Ask the backend for a longer price history of `context`.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub context: ChartContext,
    pub ticket: u64,
}

/// How close (ms) the visible left edge may get to the cached lower bound
/// before more history is requested.
pub fn threshold_ms(timeframe: TimeFrame) -> i64 {
    30 * timeframe.minutes() * 1000 * 30
}

#[derive(Debug)]
pub struct ViewportLoader {
    state: LoaderState,
    subscription: Option<SubscriptionId>,
    context: Option<ChartContext>,
    visible_from_ms: i64,
    // bumped on every resubscribe so answers for the previous context are ignored
    ticket: u64,
}

impl Default for ViewportLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewportLoader {
    pub fn new() -> Self {
        Self {
            state: LoaderState::Idle,
            subscription: None,
            context: None,
            visible_from_ms: 0,
            ticket: 0,
        }
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn context(&self) -> Option<&ChartContext> {
        self.context.as_ref()
    }

    /// Replaces any previous subscription, so at most one handler is ever
    /// attached to the surface.
    pub fn subscribe<S: ChartSurface + ?Sized>(&mut self, surface: &mut S, context: ChartContext) {
        self.unsubscribe(surface);
        let id = surface.subscribe_visible_range();
        debug!(?id, symbol = %context.symbol, timeframe = %context.timeframe, "Viewport loader subscribed");
        self.subscription = Some(id);
        self.context = Some(context);
        self.ticket += 1;
        self.state = LoaderState::Idle;
    }

    pub fn unsubscribe<S: ChartSurface + ?Sized>(&mut self, surface: &mut S) {
        if let Some(id) = self.subscription.take() {
            surface.unsubscribe_visible_range(id);
            debug!(?id, "Viewport loader unsubscribed");
        }
        self.context = None;
        self.state = LoaderState::Idle;
    }

    pub fn on_visible_range_change(&mut self, visible_from_ms: i64) -> Option<RangeQuery> {
        if self.state != LoaderState::Idle {
            return None;
        }
        let context = self.context.clone()?;
        self.state = LoaderState::CheckingBoundary;
        self.visible_from_ms = visible_from_ms;
        Some(RangeQuery {
            context,
            visible_from_ms,
            ticket: self.ticket,
        })
    }

    /// Distance to the cached edge is measured from the cached range's lower
    /// bound (`range.from`), the edge older history is appended to.
    pub fn on_range(&mut self, query: &RangeQuery, range: DateRange) -> Option<HistoryRequest> {
        if query.ticket != self.ticket || self.state != LoaderState::CheckingBoundary {
            debug!(ticket = query.ticket, "Ignoring range for a superseded query");
            return None;
        }
        let context = self.context.clone()?;

        if range.from < boundary_floor() {
            debug!(symbol = %context.symbol, from = %range.from, "Cached history already reaches the floor");
            self.state = LoaderState::Idle;
            return None;
        }

        let distance = self.visible_from_ms - range.from.timestamp_millis();
        if distance > threshold_ms(context.timeframe) {
            self.state = LoaderState::Idle;
            return None;
        }

        info!(
            symbol = %context.symbol,
            timeframe = %context.timeframe,
            cached_from = %range.from,
            "Viewport near cached edge, loading more history"
        );
        self.state = LoaderState::Fetching;
        Some(HistoryRequest {
            context,
            ticket: self.ticket,
        })
    }

    /// Swaps in the longer history. Returns false when the answer belongs to
    /// a superseded request.
    pub fn on_history<S: ChartSurface + ?Sized>(
        &mut self,
        request: &HistoryRequest,
        candles: &[Candle],
        surface: &mut S,
    ) -> bool {
        if request.ticket != self.ticket || self.state != LoaderState::Fetching {
            debug!(ticket = request.ticket, "Ignoring history for a superseded request");
            return false;
        }
        surface.set_price_data(candles);
        debug!(symbol = %request.context.symbol, count = candles.len(), "Price history replaced");
        self.state = LoaderState::Idle;
        true
    }

    pub fn on_failure(&mut self, ticket: u64, error: &dyn std::fmt::Display) {
        if ticket != self.ticket {
            return;
        }
        warn!(error = %error, state = ?self.state, "Viewport history load failed");
        self.state = LoaderState::Idle;
    }
}

/// Milliseconds for a chart-time (UNIX seconds) value.
pub fn chart_time_to_ms(seconds: i64) -> i64 {
    seconds * 1000
}

pub fn ms_to_datetime(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ChartScene;
    use chrono::{Duration, TimeZone};

    fn daily() -> ChartContext {
        ChartContext::new("MSFT", TimeFrame::Day1)
    }

    fn range_from(from: DateTime<Utc>) -> DateRange {
        DateRange {
            from,
            to: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    fn subscribed(scene: &mut ChartScene) -> ViewportLoader {
        let mut loader = ViewportLoader::new();
        loader.subscribe(scene, daily());
        loader
    }

    #[test]
    fn daily_threshold_matches_the_constant() {
        assert_eq!(threshold_ms(TimeFrame::Day1), 30 * 1440 * 1000 * 30);
        assert_eq!(threshold_ms(TimeFrame::Minute1), 900_000);
    }

    #[test]
    fn edge_within_threshold_triggers_a_fetch() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let cached_from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let edge = cached_from.timestamp_millis() + threshold_ms(TimeFrame::Day1);

        let query = loader.on_visible_range_change(edge).unwrap();
        assert_eq!(loader.state(), LoaderState::CheckingBoundary);
        let request = loader.on_range(&query, range_from(cached_from));
        assert!(request.is_some());
        assert_eq!(loader.state(), LoaderState::Fetching);
    }

    #[test]
    fn edge_beyond_threshold_does_not_fetch() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let cached_from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let edge = cached_from.timestamp_millis() + threshold_ms(TimeFrame::Day1) + 1;

        let query = loader.on_visible_range_change(edge).unwrap();
        assert!(loader.on_range(&query, range_from(cached_from)).is_none());
        assert_eq!(loader.state(), LoaderState::Idle);
    }

    #[test]
    fn cached_range_before_the_floor_never_fetches() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let cached_from = Utc.with_ymd_and_hms(2000, 1, 15, 0, 0, 0).unwrap();

        for edge in [
            cached_from.timestamp_millis() - 1,
            cached_from.timestamp_millis(),
            cached_from.timestamp_millis() + 1000,
        ] {
            let query = loader.on_visible_range_change(edge).unwrap();
            assert!(loader.on_range(&query, range_from(cached_from)).is_none());
            assert_eq!(loader.state(), LoaderState::Idle);
        }
    }

    #[test]
    fn range_changes_are_ignored_while_busy() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        assert!(loader.on_visible_range_change(0).is_some());
        assert!(loader.on_visible_range_change(10).is_none());
    }

    #[test]
    fn history_replaces_price_data_and_returns_to_idle() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let cached_from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let query = loader.on_visible_range_change(cached_from.timestamp_millis()).unwrap();
        let request = loader.on_range(&query, range_from(cached_from)).unwrap();

        let candles: Vec<Candle> = (0..3)
            .map(|i| Candle {
                time: cached_from - Duration::days(3 - i),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10.0,
            })
            .collect();
        assert!(loader.on_history(&request, &candles, &mut scene));
        assert_eq!(scene.candles().len(), 3);
        assert_eq!(loader.state(), LoaderState::Idle);
    }

    #[test]
    fn failure_returns_to_idle() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let query = loader.on_visible_range_change(0).unwrap();
        loader.on_failure(query.ticket, &"timeout");
        assert_eq!(loader.state(), LoaderState::Idle);
    }

    #[test]
    fn resubscribing_keeps_a_single_handler() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let first = loader.subscription().unwrap();
        loader.subscribe(&mut scene, ChartContext::new("MSFT", TimeFrame::Hour1));

        assert_eq!(scene.subscriber_count(), 1);
        assert_ne!(loader.subscription(), Some(first));
    }

    #[test]
    fn answers_for_a_previous_subscription_are_ignored() {
        let mut scene = ChartScene::new();
        let mut loader = subscribed(&mut scene);
        let cached_from = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let query = loader.on_visible_range_change(cached_from.timestamp_millis()).unwrap();

        loader.subscribe(&mut scene, ChartContext::new("TSLA", TimeFrame::Day1));
        assert!(loader.on_range(&query, range_from(cached_from)).is_none());
        assert_eq!(loader.state(), LoaderState::Idle);
    }
}
