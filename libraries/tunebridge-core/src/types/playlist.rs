/// Playlist domain types
use crate::types::{Platform, PlaylistId, TransferStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_status() -> TransferStatus {
    TransferStatus::Success
}

/// A playlist as listed by a platform catalog.
///
/// `id` is unique per platform only. After a transfer completes the same id
/// may appear under a different platform key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    /// Platform-scoped identifier
    pub id: PlaylistId,

    /// Display name
    pub name: String,

    /// Number of tracks
    #[serde(alias = "trackLength")]
    pub track_count: u32,

    /// Cover image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Free-form description (may contain markup from the platform)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the playlist is publicly visible
    #[serde(default)]
    pub is_public: bool,

    /// Link to the playlist on its platform
    #[serde(default)]
    pub href: String,

    /// Platform the playlist lives on
    pub platform: Platform,

    /// Owner display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Transfer state; settled catalog entries report SUCCESS
    #[serde(default = "default_status")]
    pub status: TransferStatus,
}

impl Playlist {
    /// Create a playlist with the required fields
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        platform: Platform,
        track_count: u32,
    ) -> Self {
        Self {
            id: PlaylistId::new(id),
            name: name.into(),
            track_count,
            image: None,
            description: None,
            is_public: true,
            href: String::new(),
            platform,
            owner: None,
            status: TransferStatus::Success,
        }
    }

    /// Copy of this playlist with a different status
    #[must_use]
    pub fn with_status(mut self, status: TransferStatus) -> Self {
        self.status = status;
        self
    }

    /// Snapshot of how this playlist will look on `destination`.
    #[must_use]
    pub fn for_destination(&self, destination: Platform) -> Self {
        Self {
            platform: destination,
            status: TransferStatus::Queued,
            ..self.clone()
        }
    }
}

/// A platform's playlists as returned by a catalog fetch.
///
/// Standard shape is `{ "playlists": [...], "updatedAt": ... }`; the older
/// `{ "items": [...] }` form is accepted too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistPage {
    #[serde(alias = "items")]
    pub playlists: Vec<Playlist>,

    /// Server-side freshness of the listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
