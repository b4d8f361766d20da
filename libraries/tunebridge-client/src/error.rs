//! Error types for the transfer server client.

use reqwest::Response;
use thiserror::Error;
use tunebridge_core::{FetchError, Platform, TransportError};

/// Errors that can occur when talking to the transfer server.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// No bearer token configured
    #[error("Authentication required")]
    AuthRequired,

    /// Server rejected the bearer token (401/403)
    #[error("Unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

impl ClientError {
    /// Classify a send failure
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            ClientError::ServerUnreachable(e.to_string())
        } else {
            ClientError::Request(e)
        }
    }

    /// Build the error for a non-2xx response, consuming its body
    pub(crate) async fn from_response(response: Response) -> Self {
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return ClientError::Unauthorized { status };
        }
        let message = response.text().await.unwrap_or_default();
        ClientError::ServerError { status, message }
    }

    /// Convert into a catalog fetch error for `platform`
    pub fn into_fetch(self, platform: Platform) -> FetchError {
        match self {
            ClientError::Unauthorized { status } => FetchError::Unauthorized { platform, status },
            ClientError::AuthRequired => FetchError::Unauthorized {
                platform,
                status: 401,
            },
            ClientError::ServerError { status, message } => {
                FetchError::from_status(platform, status, message)
            }
            other => FetchError::server(platform, other.to_string()),
        }
    }
}

impl From<ClientError> for TransportError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::AuthRequired => TransportError::MissingToken,
            ClientError::Unauthorized { status } => TransportError::Unauthorized { status },
            ClientError::ServerError { status, message } => TransportError::Http { status, message },
            ClientError::ServerUnreachable(msg) => TransportError::Unreachable(msg),
            ClientError::ParseError(msg) => TransportError::Parse(msg),
            ClientError::InvalidUrl(msg) => TransportError::Unreachable(msg),
            ClientError::Request(e) => TransportError::Unreachable(e.to_string()),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
