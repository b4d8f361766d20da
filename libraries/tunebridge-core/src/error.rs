/// Boundary error types for TuneBridge
use crate::types::Platform;
use thiserror::Error;

/// Failure of a catalog fetch.
///
/// Authorization problems are kept apart from everything else so callers can
/// choose between prompting for re-authorization and retrying later.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// HTTP 401/403 from the catalog endpoint
    #[error("{platform} requires re-authorization (HTTP {status})")]
    Unauthorized { platform: Platform, status: u16 },

    /// 5xx, unexpected status, network or parse failure
    #[error("{platform} catalog fetch failed: {message}")]
    Server {
        platform: Platform,
        status: Option<u16>,
        message: String,
    },

    /// No client is registered for the platform
    #[error("No client connected for {0}")]
    NotConnected(Platform),

    /// Demo/live mode switched while the fetch was in flight
    #[error("Catalog mode changed while fetching {0}")]
    Superseded(Platform),
}

impl FetchError {
    /// Create a server error without a status code
    pub fn server(platform: Platform, message: impl Into<String>) -> Self {
        Self::Server {
            platform,
            status: None,
            message: message.into(),
        }
    }

    /// Map an HTTP status to the matching variant
    pub fn from_status(platform: Platform, status: u16, message: impl Into<String>) -> Self {
        if status == 401 || status == 403 {
            Self::Unauthorized { platform, status }
        } else {
            Self::Server {
                platform,
                status: Some(status),
                message: message.into(),
            }
        }
    }

    /// Whether the caller should prompt for re-authorization
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Platform the failed fetch targeted
    pub fn platform(&self) -> Platform {
        match self {
            Self::Unauthorized { platform, .. }
            | Self::Server { platform, .. }
            | Self::NotConnected(platform)
            | Self::Superseded(platform) => *platform,
        }
    }
}

/// Failure talking to the transfer server (commit or status endpoints)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No bearer token configured
    #[error("Missing authentication token")]
    MissingToken,

    /// HTTP 401/403
    #[error("Unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// Any other non-2xx response
    #[error("Server error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Connection refused, timeout, DNS failure
    #[error("Server unreachable: {0}")]
    Unreachable(String),

    /// Response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl TransportError {
    /// HTTP status, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for catalog fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type for transfer server calls
pub type TransportResult<T> = std::result::Result<T, TransportError>;
