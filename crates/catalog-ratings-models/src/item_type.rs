use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of catalog item a rating can be attached to.
///
/// Each variant maps to exactly one path segment of the ratings endpoint,
/// e.g. `me/ratings/music-videos`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ItemType {
    #[serde(rename = "songs")]
    Song,
    #[serde(rename = "albums")]
    Album,
    #[serde(rename = "playlists")]
    Playlist,
    #[serde(rename = "music-videos")]
    MusicVideo,
    #[serde(rename = "stations")]
    Station,
}

impl ItemType {
    pub const ALL: [ItemType; 5] = [
        ItemType::Song,
        ItemType::Album,
        ItemType::Playlist,
        ItemType::MusicVideo,
        ItemType::Station,
    ];

    /// Path segment the catalog service expects for this item type.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            ItemType::Song => "songs",
            ItemType::Album => "albums",
            ItemType::Playlist => "playlists",
            ItemType::MusicVideo => "music-videos",
            ItemType::Station => "stations",
        }
    }

    /// Map a resource `type` from a response body back to an item type.
    ///
    /// Catalog resources (`songs`) and library resources (`library-songs`)
    /// both resolve; anything else (e.g. `ratings`) yields `None`.
    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        let tag = resource_type
            .strip_prefix("library-")
            .unwrap_or(resource_type);
        Self::ALL.into_iter().find(|t| t.wire_tag() == tag)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "song" | "songs" => Ok(ItemType::Song),
            "album" | "albums" => Ok(ItemType::Album),
            "playlist" | "playlists" => Ok(ItemType::Playlist),
            "musicvideo" | "musicvideos" | "music-video" | "music-videos" | "video" | "videos" => {
                Ok(ItemType::MusicVideo)
            }
            "station" | "stations" => Ok(ItemType::Station),
            _ => Err(format!(
                "Invalid item type: {}. Use 'song', 'album', 'playlist', 'music-video', or 'station'",
                s
            )),
        }
    }
}
