//! Transfer state machine
//!
//! Playlists and jobs share one lifecycle:
//!
//! ```text
//! QUEUED ──► PROCESSING ──► SUCCESS
//!    │            │
//!    └────────────┴───────► ERROR
//! ```
//!
//! SUCCESS and ERROR are terminal. Every transition is driven by an observed
//! server status and goes through [`TransferStatus::advance`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a playlist transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Selected or accepted, not started yet
    #[default]
    Queued,
    /// Server is copying the playlist
    Processing,
    /// Copy exists on the destination platform
    Success,
    /// Transfer failed; no further transitions
    Error,
}

/// Result of applying an observed status to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changes (same state, or a stale report)
    Unchanged,
    /// Legal move
    Moved {
        from: TransferStatus,
        to: TransferStatus,
    },
    /// Illegal move out of a terminal state
    Rejected {
        from: TransferStatus,
        to: TransferStatus,
    },
}

impl TransferStatus {
    /// SUCCESS and ERROR never change again
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Success | TransferStatus::Error)
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Queued => "queued",
            TransferStatus::Processing => "processing",
            TransferStatus::Success => "success",
            TransferStatus::Error => "error",
        }
    }

    /// Normalize a server status string.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Unknown values yield `None`, which callers treat as "no change".
    pub fn parse_lenient(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "queued" => Some(TransferStatus::Queued),
            "processing" => Some(TransferStatus::Processing),
            "success" => Some(TransferStatus::Success),
            "error" => Some(TransferStatus::Error),
            _ => None,
        }
    }

    /// Compute the transition for an observed status.
    pub fn advance(self, observed: TransferStatus) -> Transition {
        use TransferStatus::{Error, Processing, Queued, Success};

        if self == observed {
            return Transition::Unchanged;
        }
        if self.is_terminal() {
            return Transition::Rejected {
                from: self,
                to: observed,
            };
        }
        match (self, observed) {
            // A late "queued" report after processing started is stale
            (Processing, Queued) => Transition::Unchanged,
            (Queued, Processing | Success | Error) | (Processing, Success | Error) => {
                Transition::Moved {
                    from: self,
                    to: observed,
                }
            }
            _ => Transition::Unchanged,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
