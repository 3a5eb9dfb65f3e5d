//! Chart core: indicator overlays, scale layout and incremental history
//! loading, independent of any particular renderer or backend.
pub mod controller;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod registry;
pub mod scene;
pub mod stores;
pub mod surface;
pub mod viewport;

pub use controller::{ChartController, ChartSnapshot};
pub use error::{ChartError, FetchError};
pub use fetch::{BacktestParams, DataFetch};
pub use layout::{ScaleAllocation, ScaleId, ScaleMargins};
pub use registry::{ChartContext, FetchOutcome, IndicatorRegistry, IndicatorRequest, OverlayPalette};
pub use scene::{ChartScene, SeriesLayer, VisibleRange};
pub use surface::{CandlePoint, ChartPoint, ChartSurface, SeriesHandle, SeriesKind, SubscriptionId};
pub use viewport::{threshold_ms, HistoryRequest, LoaderState, RangeQuery, ViewportLoader};
