use http::StatusCode;
use thiserror::Error;
use tracker::TrackerError;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Errors that can occur during gateway operations.
///
/// Validation and not-found errors are raised at the boundary closest to the
/// invalid input; tracker failures keep the upstream status and body verbatim
/// for the caller to interpret. Nothing here is retried.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or missing caller input.
    #[error("{0}")]
    Validation(String),

    /// Unknown or inactive tenant. Missing configuration on the caller's
    /// side, not a system fault.
    #[error("no active tracker credentials for tenant: {0}")]
    TenantNotFound(String),

    /// The tracker rejected the tenant's credentials.
    #[error("tracker rejected the tenant credentials: status {status}")]
    TrackerAuth { status: u16, body: String },

    /// Any other non-2xx from the tracker, passed through verbatim.
    #[error("tracker request failed: status {status}")]
    Tracker { status: u16, body: String },

    /// Network-level failure reaching the tracker, timeouts included.
    #[error("could not reach the tracker: {0}")]
    Transport(String),

    /// The credential store failed. Distinct from [`GatewayError::Transport`]
    /// so a write that fails after a successful tracker validation stays
    /// diagnosable.
    #[error("credential store failure: {0}")]
    Persistence(String),
}

impl GatewayError {
    /// HTTP status the external routing layer should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::TenantNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::TrackerAuth { status, .. } | GatewayError::Tracker { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::Transport(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackerError> for GatewayError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::Auth { status, body } => GatewayError::TrackerAuth { status, body },
            TrackerError::Upstream { status, body } => GatewayError::Tracker { status, body },
            TrackerError::Transport(e) => GatewayError::Transport(e.to_string()),
            TrackerError::InvalidDomain(e) => GatewayError::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::TenantNotFound("t".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::TrackerAuth {
                status: 403,
                body: String::new()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::Tracker {
                status: 429,
                body: String::new()
            }
            .status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            GatewayError::Transport("refused".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::Persistence("disk".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
