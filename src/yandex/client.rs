//! Yandex Music API HTTP client

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::*;
use super::{AudioStream, MusicApi};
use crate::error::{ExportError, Result};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.music.yandex.net";

/// Client identification sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Connection settings for [`YandexClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub token: String,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// HTTP client for the Yandex Music REST API
#[derive(Clone)]
pub struct YandexClient {
    base_url: String,
    authorization: HeaderValue,
    http_client: Client,
}

impl YandexClient {
    /// Create a new client
    ///
    /// Fails with a configuration error when the token cannot be sent as a
    /// header value.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("OAuth {}", config.token))
            .map_err(|_| {
                ExportError::Config(
                    "access token contains characters not allowed in a header".to_string(),
                )
            })?;
        authorization.set_sensitive(true);

        let http_client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            authorization,
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the OAuth header; the user agent is set on the client itself
    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(AUTHORIZATION, self.authorization.clone())
    }

    /// Send a GET and turn any non-200 status into an error
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authorized(builder).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ExportError::Status { status, body });
        }

        Ok(response)
    }

    /// GET an API path and decode its `result` envelope
    async fn get_result<T: DeserializeOwned>(&self, path: &str, what: &'static str) -> Result<T> {
        let url = self.endpoint(path);
        debug!("Fetching {}: {}", what, url);

        let request = self
            .http_client
            .get(&url)
            .header(CONTENT_TYPE, "application/json");
        let body = self.send(request).await?.bytes().await?;

        let response: ApiResponse<T> =
            serde_json::from_slice(&body).map_err(|e| ExportError::decode(what, e))?;

        Ok(response.result)
    }
}

#[async_trait]
impl MusicApi for YandexClient {
    async fn account_status(&self) -> Result<AccountStatus> {
        self.get_result("/account/status", "account status").await
    }

    async fn user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>> {
        let playlists: Vec<Playlist> = self
            .get_result(&format!("/users/{user_id}/playlists/list"), "playlist list")
            .await?;

        debug!("Found {} playlists", playlists.len());
        Ok(playlists)
    }

    async fn liked_track_refs(&self, user_id: &str) -> Result<Vec<TrackRef>> {
        let likes: LikesResult = self
            .get_result(&format!("/users/{user_id}/likes/tracks"), "liked tracks")
            .await?;

        debug!("Found {} liked tracks", likes.library.tracks.len());
        Ok(likes.library.tracks)
    }

    async fn track(&self, track_id: &str) -> Result<Track> {
        let tracks: Vec<Track> = self
            .get_result(&format!("/tracks/{track_id}"), "track")
            .await?;

        tracks
            .into_iter()
            .next()
            .ok_or_else(|| ExportError::NotFound(format!("track {track_id}")))
    }

    async fn album_volumes(&self, album_id: &str) -> Result<Vec<Vec<Track>>> {
        let album: AlbumWithTracks = self
            .get_result(&format!("/albums/{album_id}/with-tracks"), "album")
            .await?;

        Ok(album.volumes)
    }

    async fn playlist(&self, user_id: &str, kind: i64) -> Result<Playlist> {
        self.get_result(&format!("/users/{user_id}/playlists/{kind}"), "playlist")
            .await
    }

    async fn download_variants(&self, track_id: &str) -> Result<Vec<DownloadVariant>> {
        self.get_result(&format!("/tracks/{track_id}/download-info"), "download info")
            .await
    }

    async fn fetch_descriptor(&self, url: &str) -> Result<String> {
        debug!("Fetching download descriptor: {}", url);

        let response = self.send(self.http_client.get(url)).await?;
        Ok(response.text().await?)
    }

    async fn open_audio(&self, url: &str) -> Result<AudioStream> {
        debug!("Opening audio stream: {}", url);

        let response = self.send(self.http_client.get(url)).await?;
        let content_length = response.content_length().filter(|len| *len > 0);

        Ok(AudioStream {
            content_length,
            chunks: response.bytes_stream().map_err(ExportError::from).boxed(),
        })
    }
}
