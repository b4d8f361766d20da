//! Error types for the orchestration engine.

use thiserror::Error;
use tunebridge_core::{FetchError, JobId, Platform, PlaylistId, TransportError};

/// Reasons the pending set refuses an entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PendingError {
    /// Entries already target another destination
    #[error("Pending transfers target {current}; clear them before choosing {requested}")]
    DestinationMismatch {
        current: Platform,
        requested: Platform,
    },

    /// Playlist already lives on the destination platform
    #[error("Playlist {playlist} is already on {platform}")]
    SameAsSource {
        playlist: PlaylistId,
        platform: Platform,
    },
}

/// Engine errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Pending(#[from] PendingError),

    /// The commit request itself failed; no job was registered
    #[error("Commit of {count} playlist(s) failed: {source}", count = .failed_ids.len())]
    CommitTransport {
        failed_ids: Vec<PlaylistId>,
        source: TransportError,
    },

    #[error("Transfers are unavailable in demo mode")]
    NotLive,

    /// The session was reset while the commit was in flight; the server's
    /// jobs are not tracked
    #[error("Commit discarded after a session reset ({count} job(s) untracked)", count = .job_ids.len())]
    CommitDiscarded { job_ids: Vec<JobId> },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown transfer job: {0}")]
    JobNotFound(JobId),
}

impl EngineError {
    /// Whether the caller should prompt for re-authorization
    pub fn is_auth(&self) -> bool {
        match self {
            EngineError::Fetch(e) => e.is_auth(),
            EngineError::CommitTransport { source, .. } => {
                matches!(source, TransportError::Unauthorized { .. } | TransportError::MissingToken)
            }
            _ => false,
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
