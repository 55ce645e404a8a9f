use reqwest::StatusCode;
use thiserror::Error;

/// Why a single request against the service did not take effect: either the
/// transport layer broke (connect, send, or body parse), or the server
/// answered with a status the operation does not accept.
///
/// Failures never cross a controller boundary; callers fold them into a
/// user-visible view update and log the detail.
#[derive(Debug, Error)]
pub enum RequestFailure {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{endpoint} answered {status}: {detail}")]
    Rejected {
        endpoint: String,
        status: StatusCode,
        detail: String,
    },
}

impl RequestFailure {
    pub fn rejected(
        endpoint: impl Into<String>,
        status: StatusCode,
        detail: Option<String>,
    ) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            status,
            detail: detail.unwrap_or_else(|| "no error body".to_string()),
        }
    }
}
