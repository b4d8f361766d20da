/// Streaming platform identity
use serde::{Deserialize, Serialize};
use std::fmt;

/// A streaming service a playlist lives on.
///
/// Serializes to the transfer server's wire values (`"spotify"`, `"apple"`,
/// `"soundcloud"`). Deserialization also accepts the long and upper-case
/// spellings seen from older clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    /// Spotify
    #[serde(rename = "spotify", alias = "SPOTIFY")]
    Spotify,
    /// Apple Music
    #[serde(
        rename = "apple",
        alias = "apple_music",
        alias = "APPLE_MUSIC",
        alias = "applemusic"
    )]
    AppleMusic,
    /// SoundCloud
    #[serde(rename = "soundcloud", alias = "SOUNDCLOUD")]
    SoundCloud,
}

impl Platform {
    /// Every platform, in display order.
    pub const ALL: [Platform; 3] = [Platform::AppleMusic, Platform::Spotify, Platform::SoundCloud];

    /// Wire value used in URLs and request bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Spotify => "spotify",
            Platform::AppleMusic => "apple",
            Platform::SoundCloud => "soundcloud",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Spotify => "Spotify",
            Platform::AppleMusic => "Apple Music",
            Platform::SoundCloud => "SoundCloud",
        }
    }

    /// Parse a wire or long-form platform name, ignoring case
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "spotify" => Some(Platform::Spotify),
            "apple" | "apple_music" | "applemusic" => Some(Platform::AppleMusic),
            "soundcloud" => Some(Platform::SoundCloud),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a batch of playlists is being transferred to.
///
/// Only the platform identity is carried; which side of a UI the platform
/// is rendered on never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationRef(Platform);

impl DestinationRef {
    /// Create a destination for the given platform
    pub fn new(platform: Platform) -> Self {
        Self(platform)
    }

    /// The destination platform
    pub fn platform(&self) -> Platform {
        self.0
    }
}

impl From<Platform> for DestinationRef {
    fn from(platform: Platform) -> Self {
        Self(platform)
    }
}

impl fmt::Display for DestinationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
