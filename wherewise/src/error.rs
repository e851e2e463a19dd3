//! Error types used by the crate.

use image::ImageError;
use thiserror::Error;

/// Wherewise error type.
#[derive(Debug, Error)]
pub enum WherewiseError {
    /// HTTP request failed or returned a non-success status.
    #[error("failed to load data: {0}")]
    Http(String),
    /// Error decoding a response body.
    #[error("failed to decode data")]
    Decoding(#[from] serde_json::Error),
    /// Image decoding error.
    #[error("image decode error: {0:?}")]
    ImageDecode(#[from] ImageError),
    /// Generic error - details are inside.
    #[error("{0}")]
    Generic(String),
}

impl From<reqwest::Error> for WherewiseError {
    fn from(value: reqwest::Error) -> Self {
        Self::Http(value.to_string())
    }
}
