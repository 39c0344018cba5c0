//! Error types raised by the IGDB catalog client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`IgdbError`] failures.
pub type IgdbResult<T> = Result<T, IgdbError>;

/// Failures that can occur while talking to IGDB or its token endpoint.
#[derive(Debug, Error)]
pub enum IgdbError {
    /// Required environment variable is missing or blank.
    #[error("missing IGDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build IGDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The access token could not be obtained.
    #[error("failed to fetch IGDB access token")]
    TokenRequest {
        #[source]
        source: reqwest::Error,
    },
    /// The token endpoint answered with an unexpected status.
    #[error("unexpected IGDB token response status {status}")]
    TokenStatus { status: StatusCode },
    /// A query could not be sent.
    #[error("failed to send IGDB request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// IGDB returned an unexpected status code.
    #[error("unexpected IGDB response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into JSON.
    #[error("failed to decode IGDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl IgdbError {
    /// Whether the failure was caused by the client-side timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            IgdbError::TokenRequest { source }
            | IgdbError::RequestSend { source, .. }
            | IgdbError::DecodeResponse { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
