/// ID types for TuneBridge entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Prefix of job ids synthesized locally for items the server never accepted
pub const LOCAL_JOB_PREFIX: &str = "local-";

/// Playlist identifier, unique per platform
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(String);

impl PlaylistId {
    /// Create a new playlist ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlaylistId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Transfer job identifier.
///
/// Either issued by the transfer server or synthesized locally for items
/// rejected at commit time. Local ids are never polled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wrap a server-issued job ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a local ID for a job that has no server counterpart
    pub fn local() -> Self {
        Self(format!("{}{}", LOCAL_JOB_PREFIX, Uuid::new_v4()))
    }

    /// Whether this ID was synthesized locally
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_JOB_PREFIX)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
