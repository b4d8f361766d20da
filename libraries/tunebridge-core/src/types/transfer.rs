//! Wire shapes exchanged with the transfer server.

use crate::types::{JobId, Platform, Playlist, PlaylistId};
use serde::{Deserialize, Serialize};

// =============================================================================
// Commit
// =============================================================================

/// One playlist in a commit batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    pub src_playlist_id: PlaylistId,
    pub src_platform: Platform,
    pub dest_platform: Platform,
}

/// Body of `POST /transfer`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferBatchRequest {
    pub items: Vec<TransferItem>,
    pub destination: Platform,
}

impl TransferBatchRequest {
    /// Build a batch moving `playlists` to `destination`
    pub fn new(playlists: &[Playlist], destination: Platform) -> Self {
        Self {
            items: playlists
                .iter()
                .map(|playlist| TransferItem {
                    src_playlist_id: playlist.id.clone(),
                    src_platform: playlist.platform,
                    dest_platform: destination,
                })
                .collect(),
            destination,
        }
    }
}

/// Per-item result echoed back by servers that correlate by source id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItemResult {
    pub src_playlist_id: PlaylistId,
    #[serde(default)]
    pub job_id: Option<JobId>,
    #[serde(default)]
    pub failed: bool,
}

/// Body of a successful `POST /transfer` response.
///
/// `results` is preferred. `ids` / `failed_ids` is the older positional form
/// where `failed_ids` holds source playlist ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferBatchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<TransferItemResult>>,
    #[serde(default)]
    pub ids: Vec<JobId>,
    #[serde(default)]
    pub failed_ids: Vec<PlaylistId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

// =============================================================================
// Status
// =============================================================================

/// Body of `GET /transfer/{jobId}`.
///
/// `status` stays a raw string; unknown values must not fail the poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStatusReport {
    pub id: JobId,
    pub status: String,
    #[serde(default, alias = "srcPlaylistID")]
    pub src_playlist_id: Option<PlaylistId>,
    #[serde(default, alias = "destPlaylistID")]
    pub dest_playlist_id: Option<PlaylistId>,
    #[serde(default)]
    pub error: Option<String>,
}
