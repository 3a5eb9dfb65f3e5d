pub mod error;
pub mod indicator;
pub mod models;
pub mod utils;

pub use error::ParseError;
pub use indicator::{Indicator, IndicatorFamily, PREDEFINED_INDICATORS};
