use thiserror::Error;

/// Errors produced by strategy construction, evaluation, and backtesting
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameter `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("unsupported strategy type `{0}`")]
    UnsupportedStrategy(String),

    #[error("candle data error: {0}")]
    CandleData(String),

    #[error("indicator frame error: {0}")]
    Frame(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Error::Validation {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
