//! Fixture playlists shown when no session exists.

use tunebridge_core::{Platform, Playlist};

const DEMO_OWNER: &str = "N/A";

// (id, name, tracks, description, public)
type Fixture = (&'static str, &'static str, u32, &'static str, bool);

const APPLE_MUSIC: &[Fixture] = &[
    ("5eE7bZSSRHk8tH9vnvr8PY", "Blanke: The Complete Discography", 113, "Every Official Blanke release, all in one place.", true),
    ("6wxY88TAT13R8lOrKOHcxh", "cupid arrows", 119, "Melodic", true),
    ("0Ff7APaCffbP0OefRDeGXJ", "loud noises", 181, "kinda edm type shit", true),
    ("7BqzVOIKtRpek9fnVKVqDJ", "melatones", 41, "", false),
    ("5wzJ9vJ3s3fPLMb48OS6X4", "iv summer", 34, "", true),
    ("4kYH3PKLFqDP6BOhzDoFH1", "sf nostalgia drive", 43, "", true),
    ("4DhbwSnCJnId217ZP7I4MU", "7", 176, "edm", true),
    ("21wOkIvPvBx6ODlhwejZLO", "mini headbangers", 98, "", true),
];

const SPOTIFY: &[Fixture] = &[
    ("6nCvaIuuHBKZzezuoNEUVv", "new start", 338, "", true),
    ("0cpNXzbsKRFGOjGPFY0QcL", "crossfaded :)", 314, "", true),
    ("76VCAgb7P7A3RgfifQ1PeV", "ThRoWbAcKs!!", 133, "", true),
    ("1SBQjV0gWSgNLz2wamiMc0", "close your eyes", 183, "", true),
    ("14HRPClKvi5f07xXf5Skqo", "random :)", 239, "", true),
    ("6hNhKgFf54CWukmxlihK8n", "Lit", 298, "", true),
    ("2XaNOXFGiyrUzUdKAv8pBH", ":/", 59, "to sum up everything", true),
    ("0lVL6s3j29JNvGOz3gNrb0", "bye", 25, "", true),
];

const SOUNDCLOUD: &[Fixture] = &[
    ("760HL7SP8NkIFGLg85BZER", "down", 20, "1 hour hope it helps", true),
    ("5nUyv9wyZKjdUW1rk3smTo", "The Sound of Gen Z Singer-Songwriter", 237, "", true),
    ("6mg8i6k6RPOjTDwpBTiqpl", "im fine lol (dies inside)", 69, "", true),
    ("7fIRvjOwVvVQxXBN0upspR", "power outage", 2145, "", false),
    ("3MCKUvRdc5jQ4vXh89YGkU", "lol. k.", 611, "", true),
    ("2ZQRscCoonXgsCp6fojk92", "void", 244, "", true),
    ("4nmxkJj6J0dmGtumQZqdWu", "transpire", 85, "in the moment inspiration playlist", false),
    ("7khYXjFxX3YnBMwntW4WHp", "coast line", 145, "melodic edm", true),
];

/// Demo listing for `platform`
pub fn playlists(platform: Platform) -> Vec<Playlist> {
    let fixtures = match platform {
        Platform::AppleMusic => APPLE_MUSIC,
        Platform::Spotify => SPOTIFY,
        Platform::SoundCloud => SOUNDCLOUD,
    };

    fixtures
        .iter()
        .map(|&(id, name, tracks, description, is_public)| {
            let mut playlist = Playlist::new(id, name, platform, tracks);
            playlist.description = (!description.is_empty()).then(|| description.to_string());
            playlist.is_public = is_public;
            playlist.href = format!("https://open.spotify.com/playlist/{id}");
            playlist.owner = Some(DEMO_OWNER.to_string());
            playlist
        })
        .collect()
}
