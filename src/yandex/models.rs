//! Yandex Music API response models
//!
//! The API is loose about types: ids come back as numbers on one endpoint and
//! strings on another, and most fields may be missing or `null`. Every field
//! is therefore optional or defaulted, and each endpoint gets its own envelope.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Wrapper for all API responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

/// An id that may arrive as a JSON number or a JSON string
///
/// Variants are tried in order, so ids above `i64::MAX` land in `Unsigned`
/// rather than losing digits in `Float`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl Identifier {
    /// Canonical string form: base-10 digits for numbers, strings unchanged
    pub fn canonical(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Unsigned(n) => n.to_string(),
            Self::Float(f) => format!("{f:.0}"),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical())
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// account/status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountStatus {
    #[serde(default)]
    pub account: Account,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Account {
    pub uid: Option<i64>,
    pub login: Option<String>,
    #[serde(alias = "displayName")]
    pub display_name: Option<String>,
}

impl Account {
    /// Account id as a string, `None` when the server left it empty
    pub fn user_id(&self) -> Option<String> {
        self.uid.filter(|uid| *uid != 0).map(|uid| uid.to_string())
    }
}

/// Artist credited on a track
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artist {
    pub id: Option<Identifier>,
    #[serde(default)]
    pub name: String,
}

/// Album a track appears on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Option<Identifier>,
    pub title: Option<String>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub cover_uri: Option<String>,
    pub track_count: Option<u32>,
}

/// Full track record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: Option<Identifier>,
    pub real_id: Option<Identifier>,
    #[serde(default)]
    pub title: String,
    pub duration_ms: Option<u64>,
    pub track_number: Option<u32>,
    pub year: Option<u32>,
    pub genre: Option<String>,
    pub cover_uri: Option<String>,
    pub og_image: Option<String>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub albums: Vec<Album>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

impl Track {
    /// Canonical id used for every per-track endpoint
    pub fn canonical_id(&self) -> Option<String> {
        self.id.as_ref().map(Identifier::canonical)
    }

    pub fn first_album(&self) -> Option<&Album> {
        self.albums.first()
    }

    /// Credited artist names joined with ", " (empty when nobody is credited)
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Artist string for display and file names
    pub fn display_artist(&self) -> String {
        let names = self.artist_names();
        if names.is_empty() {
            "Unknown Artist".to_string()
        } else {
            names
        }
    }

    /// Track year, else the first album's year
    pub fn resolved_year(&self) -> Option<u32> {
        self.year
            .filter(|y| *y != 0)
            .or_else(|| self.first_album().and_then(|a| a.year))
            .filter(|y| *y != 0)
    }

    /// Track genre, else the first album's genre
    pub fn resolved_genre(&self) -> Option<&str> {
        non_empty(self.genre.as_deref())
            .or_else(|| self.first_album().and_then(|a| non_empty(a.genre.as_deref())))
    }

    /// Track cover, else the share image, else the first album's cover
    pub fn resolved_cover(&self) -> Option<&str> {
        non_empty(self.cover_uri.as_deref())
            .or_else(|| non_empty(self.og_image.as_deref()))
            .or_else(|| {
                self.first_album()
                    .and_then(|a| non_empty(a.cover_uri.as_deref()))
            })
    }
}

/// Playlist entry; the full track is embedded on most responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackShort {
    pub id: Option<Identifier>,
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistOwner {
    pub uid: Option<i64>,
    pub login: Option<String>,
}

impl PlaylistOwner {
    /// Login when known, else the numeric id
    pub fn label(&self) -> Option<String> {
        self.login
            .clone()
            .filter(|login| !login.is_empty())
            .or_else(|| self.uid.filter(|uid| *uid != 0).map(|uid| uid.to_string()))
    }
}

/// Playlist metadata, with tracks when fetched by kind
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub owner: Option<PlaylistOwner>,
    #[serde(default)]
    pub title: String,
    pub kind: Option<i64>,
    pub playlist_uuid: Option<String>,
    pub playlist_id: Option<Identifier>,
    #[serde(default)]
    pub tracks: Vec<TrackShort>,
    pub track_count: Option<u32>,
}

impl Playlist {
    /// Whether `reference` names this playlist by UUID or raw id
    pub fn matches(&self, reference: &str) -> bool {
        self.playlist_uuid.as_deref() == Some(reference)
            || self
                .playlist_id
                .as_ref()
                .is_some_and(|id| id.canonical() == reference)
    }

    /// Id shown to users: the UUID when known, else the kind
    pub fn display_id(&self) -> String {
        match (self.playlist_uuid.as_deref(), self.kind) {
            (Some(uuid), _) if !uuid.is_empty() => uuid.to_string(),
            (_, Some(kind)) if kind != 0 => kind.to_string(),
            _ => String::new(),
        }
    }
}

// users/{id}/likes/tracks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LikesResult {
    #[serde(default)]
    pub library: Library,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub tracks: Vec<TrackRef>,
}

/// Minimal reference returned by the likes listing
#[derive(Debug, Clone, Deserialize)]
pub struct TrackRef {
    pub id: Identifier,
}

// albums/{id}/with-tracks
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlbumWithTracks {
    #[serde(default)]
    pub volumes: Vec<Vec<Track>>,
}

/// One quality/format variant from tracks/{id}/download-info
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadVariant {
    pub codec: Option<String>,
    #[serde(alias = "bitrate")]
    pub bitrate_in_kbps: Option<u32>,
    #[serde(default)]
    pub download_info_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_number_and_string_agree() {
        let from_number: Identifier = serde_json::from_str("12345").unwrap();
        let from_string: Identifier = serde_json::from_str("\"12345\"").unwrap();
        assert_eq!(from_number.canonical(), "12345");
        assert_eq!(from_string.canonical(), "12345");
    }

    #[test]
    fn test_identifier_keeps_ids_beyond_i64() {
        let id: Identifier = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(id, Identifier::Unsigned(u64::MAX));
        assert_eq!(id.canonical(), "18446744073709551615");

        let negative: Identifier = serde_json::from_str("-7").unwrap();
        assert_eq!(negative.canonical(), "-7");
    }

    #[test]
    fn test_listing_ignores_fields_it_does_not_use() {
        let json = r#"{
            "title": "Mix",
            "kind": 3,
            "revision": -1,
            "visibility": 0,
            "owner": {"uid": 42, "login": "", "name": "x"}
        }"#;
        let playlist: Playlist = serde_json::from_str(json).unwrap();
        assert_eq!(playlist.kind, Some(3));
        assert_eq!(
            playlist.owner.and_then(|o| o.label()).as_deref(),
            Some("42")
        );
    }

    #[test]
    fn test_identifier_float_has_no_fraction() {
        let id: Identifier = serde_json::from_str("12345.0").unwrap();
        assert_eq!(id.canonical(), "12345");
    }

    #[test]
    fn test_identifier_serializes_canonically() {
        let json = serde_json::to_string(&Identifier::Integer(7)).unwrap();
        assert_eq!(json, "\"7\"");
    }

    #[test]
    fn test_track_tolerates_nulls_and_mixed_ids() {
        let json = r#"{
            "id": "44",
            "realId": 44,
            "title": "Song",
            "year": null,
            "artists": [{"id": 1, "name": "A"}, {"id": "2", "name": "B"}],
            "albums": [{"id": 9, "title": "LP", "year": 1999, "genre": "rock", "trackCount": 12}]
        }"#;
        let track: Track = serde_json::from_str(json).unwrap();
        assert_eq!(track.canonical_id().as_deref(), Some("44"));
        assert_eq!(track.artist_names(), "A, B");
        assert_eq!(track.resolved_year(), Some(1999));
        assert_eq!(track.resolved_genre(), Some("rock"));
    }

    #[test]
    fn test_year_and_genre_fall_back_to_album() {
        let track = Track {
            year: Some(0),
            genre: Some(String::new()),
            albums: vec![Album {
                year: Some(1999),
                genre: Some("rock".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(track.resolved_year(), Some(1999));
        assert_eq!(track.resolved_genre(), Some("rock"));
    }

    #[test]
    fn test_track_values_win_over_album() {
        let track = Track {
            year: Some(2005),
            genre: Some("jazz".to_string()),
            albums: vec![Album {
                year: Some(1999),
                genre: Some("rock".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(track.resolved_year(), Some(2005));
        assert_eq!(track.resolved_genre(), Some("jazz"));
    }

    #[test]
    fn test_cover_fallback_order() {
        let mut track = Track {
            og_image: Some("og/%%".to_string()),
            albums: vec![Album {
                cover_uri: Some("album/%%".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(track.resolved_cover(), Some("og/%%"));
        track.og_image = None;
        assert_eq!(track.resolved_cover(), Some("album/%%"));
        track.cover_uri = Some("track/%%".to_string());
        assert_eq!(track.resolved_cover(), Some("track/%%"));
    }

    #[test]
    fn test_display_artist_placeholder() {
        assert_eq!(Track::default().display_artist(), "Unknown Artist");
    }

    #[test]
    fn test_playlist_matching_and_display_id() {
        let playlist: Playlist = serde_json::from_str(
            r#"{"title": "Mix", "kind": 1003, "playlistUuid": "abcd-uuid", "playlistId": "42:1003"}"#,
        )
        .unwrap();
        assert!(playlist.matches("abcd-uuid"));
        assert!(playlist.matches("42:1003"));
        assert!(!playlist.matches("1003"));
        assert_eq!(playlist.display_id(), "abcd-uuid");

        let by_kind = Playlist {
            kind: Some(3),
            ..Default::default()
        };
        assert_eq!(by_kind.display_id(), "3");
    }
}
