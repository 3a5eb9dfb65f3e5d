use thiserror::Error;

use shared::ParseError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidArgument(String),

    #[error("Upstream data error: {0}")]
    UpstreamError(String),

    #[error("Market data store error: {0}")]
    MarketDataError(String),

    #[error("Indicator calculation error: {0}")]
    IndicatorError(String),

    #[error("Backtest error: {0}")]
    BacktestError(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        EngineError::InvalidArgument(err.to_string())
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::UpstreamError(err.to_string())
    }
}

impl From<EngineError> for tonic::Status {
    fn from(err: EngineError) -> Self {
        tracing::error!("Mapping EngineError to tonic::Status: {:?}", err);
        match err {
            EngineError::ConfigError(msg) => tonic::Status::failed_precondition(format!("Configuration error: {}", msg)),
            EngineError::IoError { source } => tonic::Status::internal(format!("I/O error: {}", source)),
            EngineError::JsonError { source } => tonic::Status::internal(format!("JSON error: {}", source)),
            EngineError::InvalidArgument(msg) => tonic::Status::invalid_argument(msg),
            EngineError::UpstreamError(msg) => tonic::Status::unavailable(format!("Upstream data error: {}", msg)),
            EngineError::MarketDataError(msg) => {
                if msg.to_lowercase().contains("not found") {
                    tonic::Status::not_found(msg)
                } else {
                    tonic::Status::internal(format!("Market data error: {}", msg))
                }
            }
            EngineError::IndicatorError(msg) => tonic::Status::invalid_argument(format!("Indicator calculation error: {}", msg)),
            EngineError::BacktestError(msg) => tonic::Status::invalid_argument(format!("Backtest error: {}", msg)),
            EngineError::ProcessingError(msg) => tonic::Status::internal(format!("Processing error: {}", msg)),
            EngineError::AnyhowError(source) => tonic::Status::internal(format!("An internal error occurred: {}", source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_become_invalid_argument() {
        let err: EngineError = ParseError::UnknownTimeFrame("2D".to_string()).into();
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert!(status.message().contains("2D"));
    }

    #[test]
    fn missing_market_data_maps_to_not_found() {
        let status: tonic::Status = EngineError::MarketDataError("Series not found for AAPL".into()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);
    }

    #[test]
    fn upstream_failures_are_unavailable() {
        let status: tonic::Status = EngineError::UpstreamError("HTTP 500".into()).into();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }
}
