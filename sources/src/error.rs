use thiserror::Error;

/// Custom error type for feeds, allow us to differentiate between errors.
///
/// None of these is fatal: a failed fetch aborts the current poll cycle and the next one
/// starts from scratch.
///
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Bad HTTP status: {0}")]
    Status(u16),
    #[error("Can not decode feed data: {0}")]
    Decode(#[from] serde_json::Error),
}
