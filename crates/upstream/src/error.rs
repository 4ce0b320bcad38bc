use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The service refused the credential we presented.
    #[error("credential rejected")]
    Rejected,
    #[error("upstream returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}
