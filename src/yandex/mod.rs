//! Yandex Music API client module

pub mod client;
pub mod download_info;
pub mod models;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::Result;

pub use client::{ClientConfig, YandexClient};
pub use download_info::DownloadDescriptor;
pub use models::*;

/// An audio response body being streamed from storage
pub struct AudioStream {
    /// Total size when the server declared one
    pub content_length: Option<u64>,
    pub chunks: BoxStream<'static, Result<Bytes>>,
}

/// Remote calls the exporter depends on, one method per endpoint
#[async_trait]
pub trait MusicApi: Send + Sync {
    async fn account_status(&self) -> Result<AccountStatus>;

    async fn user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>>;

    async fn liked_track_refs(&self, user_id: &str) -> Result<Vec<TrackRef>>;

    async fn track(&self, track_id: &str) -> Result<Track>;

    /// Album tracks grouped by volume (disc)
    async fn album_volumes(&self, album_id: &str) -> Result<Vec<Vec<Track>>>;

    async fn playlist(&self, user_id: &str, kind: i64) -> Result<Playlist>;

    /// Stage one of link resolution: the quality/format variants of a track
    async fn download_variants(&self, track_id: &str) -> Result<Vec<DownloadVariant>>;

    /// Stage two of link resolution: the raw descriptor document
    async fn fetch_descriptor(&self, url: &str) -> Result<String>;

    async fn open_audio(&self, url: &str) -> Result<AudioStream>;
}
