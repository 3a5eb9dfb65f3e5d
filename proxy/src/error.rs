use thiserror::Error;

use shared::ParseError;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ParseError> for ProxyError {
    fn from(err: ParseError) -> Self {
        ProxyError::InvalidRequest(err.to_string())
    }
}
