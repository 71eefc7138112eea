//! Track catalog fetching and reference resolution
//!
//! Turns user-facing references (an empty or `me` user, a playlist kind or
//! UUID, an album id) into ordered lists of full [`Track`] records.

use tracing::{debug, warn};

use crate::error::{ExportError, Result};
use crate::yandex::{Identifier, MusicApi, Playlist, Track};

/// User reference meaning "the account the token belongs to"
pub const CURRENT_USER: &str = "me";

/// Map an empty or `me` user reference to the concrete account id
///
/// Any other reference is returned as-is without a network call.
pub async fn resolve_user(api: &dyn MusicApi, user: &str) -> Result<String> {
    if !user.is_empty() && user != CURRENT_USER {
        return Ok(user.to_string());
    }

    let status = api
        .account_status()
        .await
        .map_err(|e| ExportError::Resolution(e.to_string()))?;

    let user_id = status
        .account
        .user_id()
        .ok_or_else(|| ExportError::Resolution("account id is empty".to_string()))?;

    debug!("Resolved current account to {}", user_id);
    Ok(user_id)
}

/// Map a playlist reference to its numeric kind
///
/// Numeric references are used directly. Anything else costs one listing call
/// and is matched against each playlist's UUID and raw id, first match wins.
pub async fn resolve_playlist_kind(
    api: &dyn MusicApi,
    reference: &str,
    user_id: &str,
) -> Result<i64> {
    if let Ok(kind) = reference.parse::<i64>() {
        return Ok(kind);
    }

    debug!("Looking up playlist {} in listing of {}", reference, user_id);
    let playlists = api.user_playlists(user_id).await?;

    playlists
        .iter()
        .find(|p| p.matches(reference))
        .and_then(|p| p.kind)
        .ok_or_else(|| ExportError::NotFound(format!("playlist {reference}")))
}

/// Fetches catalogs from the remote API
pub struct CatalogFetcher<'a> {
    api: &'a dyn MusicApi,
}

impl<'a> CatalogFetcher<'a> {
    pub fn new(api: &'a dyn MusicApi) -> Self {
        Self { api }
    }

    /// All playlists owned by `user`
    pub async fn playlists(&self, user: &str) -> Result<Vec<Playlist>> {
        let user_id = resolve_user(self.api, user).await?;
        self.api.user_playlists(&user_id).await
    }

    /// Tracks of one playlist, in playlist order
    pub async fn playlist_tracks(&self, user: &str, reference: &str) -> Result<Vec<Track>> {
        let user_id = resolve_user(self.api, user).await?;
        let kind = resolve_playlist_kind(self.api, reference, &user_id).await?;
        let playlist = self.api.playlist(&user_id, kind).await?;

        debug!(
            "Playlist '{}' (kind {}) has {} entries",
            playlist.title,
            kind,
            playlist.tracks.len()
        );

        let mut tracks = Vec::with_capacity(playlist.tracks.len());
        for entry in playlist.tracks {
            match (entry.track, entry.id) {
                (Some(track), _) => tracks.push(track),
                (None, Some(id)) => {
                    if let Some(track) = self.fetch_or_skip(&id).await {
                        tracks.push(track);
                    }
                }
                (None, None) => warn!("Skipping playlist entry without a track id"),
            }
        }

        Ok(tracks)
    }

    /// The user's liked tracks, one full-record fetch per reference
    pub async fn liked_tracks(&self, user: &str) -> Result<Vec<Track>> {
        let user_id = resolve_user(self.api, user).await?;
        let refs = self.api.liked_track_refs(&user_id).await?;

        let mut tracks = Vec::with_capacity(refs.len());
        for track_ref in refs {
            if let Some(track) = self.fetch_or_skip(&track_ref.id).await {
                tracks.push(track);
            }
        }

        Ok(tracks)
    }

    /// Album tracks with all volumes flattened in order
    pub async fn album_tracks(&self, album_id: &str) -> Result<Vec<Track>> {
        let volumes = self.api.album_volumes(album_id).await?;
        Ok(volumes.into_iter().flatten().collect())
    }

    /// Fetch a full track record; failures are logged and the entry dropped
    async fn fetch_or_skip(&self, id: &Identifier) -> Option<Track> {
        match self.api.track(&id.canonical()).await {
            Ok(track) => Some(track),
            Err(e) => {
                warn!("Failed to fetch track {}: {}", id, e);
                None
            }
        }
    }
}
