use reqwest::StatusCode;
use thiserror::Error;

/// Failures at the estimation-service boundary.
///
/// Both remote operations (net-income estimation and budget analysis) fail
/// with this error; callers decide how much detail to surface.
#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("request to estimation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("estimation service returned HTTP {0}")]
    Status(StatusCode),

    #[error("could not parse estimation service response: {0}")]
    Malformed(String),

    #[error("estimation service returned an empty response")]
    Empty,
}
