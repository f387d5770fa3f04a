use thiserror::Error;

/// Result type alias for tracker operations
pub type Result<T, E = TrackerError> = std::result::Result<T, E>;

/// Errors that can occur while talking to the tracker's REST API
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The tracker rejected the credentials carried on the request.
    /// Status and body are preserved verbatim for the caller.
    #[error("tracker rejected the credentials: status {status}")]
    Auth { status: u16, body: String },

    /// Any other non-2xx response from the tracker.
    /// Status and body are preserved verbatim for the caller.
    #[error("tracker request failed: status {status}")]
    Upstream { status: u16, body: String },

    #[error("could not reach the tracker: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid tracker domain: {0}")]
    InvalidDomain(#[from] url::ParseError),
}
