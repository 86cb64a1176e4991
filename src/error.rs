//! Error types for the epidata client.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building, sending, or decoding an epidata call.
#[derive(Error, Debug)]
pub enum Error {
    /// A user-supplied temporal value did not match any recognized shape
    /// (`YYYYWW`, `YYYYMMDD`, or `YYYY-MM-DD`).
    #[error("cannot parse date or week from `{0}`")]
    ParseDateOrWeek(String),

    /// An endpoint wrapper rejected its arguments (mutually exclusive
    /// parameters, missing required alternatives).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A typed fetch mode was requested on an endpoint that only supports
    /// the classic message format.
    #[error("endpoint `{0}` only supports the classic message format")]
    OnlySupportsClassicFormat(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
