//! Plain-text and JSON rendering of listings

use clap::ValueEnum;
use serde::Serialize;

use crate::yandex::{Playlist, PlaylistOwner, Track};

/// How listings are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated lines
    Text,
    /// Indented JSON array
    Json,
}

/// One track with its resolved link (empty when resolution failed)
#[derive(Debug, Clone, Serialize)]
pub struct TrackRow {
    pub title: String,
    pub artist: String,
    pub link: String,
}

impl TrackRow {
    pub fn new(track: &Track, link: Option<String>) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.display_artist(),
            link: link.unwrap_or_default(),
        }
    }

    pub fn text_line(&self) -> String {
        format!("{} — {}\t{}", self.title, self.artist, self.link)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaylistRow {
    pub title: String,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl PlaylistRow {
    pub fn new(playlist: &Playlist) -> Self {
        Self {
            title: playlist.title.clone(),
            id: playlist.display_id(),
            uuid: playlist.playlist_uuid.clone().filter(|u| !u.is_empty()),
            kind: playlist.kind.filter(|k| *k != 0),
            tracks: playlist.track_count.filter(|n| *n != 0),
            owner: playlist.owner.as_ref().and_then(PlaylistOwner::label),
        }
    }

    pub fn text_line(&self) -> String {
        format!("{}\t{}", self.title, self.id)
    }
}

/// Pretty-printed JSON for a list of rows
pub fn to_json<T: Serialize>(rows: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}
