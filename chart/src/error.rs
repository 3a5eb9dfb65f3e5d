use thiserror::Error;

use crate::surface::SeriesHandle;

/// Failure reported by the data-fetch boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Backend rejected the request: {0}")]
    Remote(String),

    #[error("Malformed backend response: {0}")]
    Decode(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("No series with handle {0:?} on this chart")]
    UnknownSeries(SeriesHandle),

    #[error("No symbol selected")]
    NoSymbolSelected,

    #[error("Backtest range must span at least three months")]
    InvalidDateRange,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
