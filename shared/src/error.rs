use thiserror::Error;

use crate::indicator::IndicatorFamily;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty indicator key")]
    EmptyKey,

    #[error("Unknown indicator family: {0}")]
    UnknownFamily(String),

    #[error("{family} takes {expected} parameter(s), got {found}")]
    ParamCount {
        family: IndicatorFamily,
        expected: usize,
        found: usize,
    },

    #[error("Indicator parameters must be positive integers, got '{0}'")]
    InvalidParam(String),

    #[error("Unknown timeframe: {0}")]
    UnknownTimeFrame(String),

    #[error("Unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error("Unknown trade signal: {0}")]
    UnknownSignal(String),

    #[error("Invalid date '{0}', expected yyyy-mm-dd or RFC 3339")]
    InvalidDate(String),
}
