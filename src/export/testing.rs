//! In-memory `MusicApi` used by the export tests

use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use crate::error::{ExportError, Result};
use crate::yandex::*;

/// Canned responses plus a log of every call made
pub struct FakeApi {
    pub account: AccountStatus,
    pub playlists: Vec<Playlist>,
    pub playlist: Playlist,
    pub likes: Vec<TrackRef>,
    pub fail_likes: bool,
    pub tracks: Vec<Track>,
    pub volumes: Vec<Vec<Track>>,
    /// Track ids whose download-info list comes back empty
    pub no_variants: Vec<String>,
    /// Track ids whose first variant carries an empty descriptor URL
    pub empty_links: Vec<String>,
    /// Track ids whose descriptor request fails
    pub broken_descriptors: Vec<String>,
    /// Track ids whose audio stream breaks after the first chunk
    pub broken_streams: Vec<String>,
    /// Audio body served for every media URL
    pub audio: Vec<u8>,
    pub declare_length: bool,
    pub log: Mutex<Vec<&'static str>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            account: AccountStatus {
                account: Account {
                    uid: Some(42),
                    login: Some("listener".to_string()),
                    ..Default::default()
                },
            },
            playlists: Vec::new(),
            playlist: Playlist::default(),
            likes: Vec::new(),
            fail_likes: false,
            tracks: Vec::new(),
            volumes: Vec::new(),
            no_variants: Vec::new(),
            empty_links: Vec::new(),
            broken_descriptors: Vec::new(),
            broken_streams: Vec::new(),
            audio: vec![0u8; 4096],
            declare_length: true,
            log: Mutex::new(Vec::new()),
        }
    }
}

impl FakeApi {
    fn record(&self, call: &'static str) {
        self.log.lock().unwrap().push(call);
    }

    /// Number of times the named endpoint was called
    pub fn calls(&self, call: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    /// Total number of calls across all endpoints
    pub fn total_calls(&self) -> usize {
        self.log.lock().unwrap().len()
    }
}

#[async_trait]
impl MusicApi for FakeApi {
    async fn account_status(&self) -> Result<AccountStatus> {
        self.record("account_status");
        Ok(self.account.clone())
    }

    async fn user_playlists(&self, _user_id: &str) -> Result<Vec<Playlist>> {
        self.record("user_playlists");
        Ok(self.playlists.clone())
    }

    async fn liked_track_refs(&self, _user_id: &str) -> Result<Vec<TrackRef>> {
        self.record("liked_track_refs");
        if self.fail_likes {
            return Err(ExportError::NotFound("likes".to_string()));
        }
        Ok(self.likes.clone())
    }

    async fn track(&self, track_id: &str) -> Result<Track> {
        self.record("track");
        self.tracks
            .iter()
            .find(|t| t.canonical_id().as_deref() == Some(track_id))
            .cloned()
            .ok_or_else(|| ExportError::NotFound(format!("track {track_id}")))
    }

    async fn album_volumes(&self, _album_id: &str) -> Result<Vec<Vec<Track>>> {
        self.record("album_volumes");
        Ok(self.volumes.clone())
    }

    async fn playlist(&self, _user_id: &str, _kind: i64) -> Result<Playlist> {
        self.record("playlist");
        Ok(self.playlist.clone())
    }

    async fn download_variants(&self, track_id: &str) -> Result<Vec<DownloadVariant>> {
        self.record("download_variants");
        if self.no_variants.iter().any(|id| id == track_id) {
            return Ok(Vec::new());
        }
        let first_link = if self.empty_links.iter().any(|id| id == track_id) {
            String::new()
        } else {
            format!("https://meta.example/info/{track_id}")
        };
        Ok(vec![
            DownloadVariant {
                codec: Some("mp3".to_string()),
                bitrate_in_kbps: Some(320),
                download_info_url: first_link,
            },
            DownloadVariant {
                codec: Some("mp3".to_string()),
                bitrate_in_kbps: Some(128),
                download_info_url: "https://meta.example/info/second".to_string(),
            },
        ])
    }

    async fn fetch_descriptor(&self, url: &str) -> Result<String> {
        self.record("fetch_descriptor");
        let id = url.rsplit('/').next().unwrap_or_default();
        if self.broken_descriptors.iter().any(|broken| broken == id) {
            return Err(ExportError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "descriptor unavailable".to_string(),
            });
        }
        Ok(format!(
            "<download-info><host>storage.example</host><path>/music/{id}</path>\
             <ts>123</ts><region>-1</region><s>SIG</s></download-info>"
        ))
    }

    async fn open_audio(&self, url: &str) -> Result<AudioStream> {
        self.record("open_audio");
        let mut chunks: Vec<Result<Bytes>> = self
            .audio
            .chunks(1000)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();

        let id = url.rsplit('/').next().unwrap_or_default();
        if self.broken_streams.iter().any(|broken| broken == id) {
            chunks.truncate(1);
            chunks.push(Err(ExportError::io(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset"),
            )));
        }

        Ok(AudioStream {
            content_length: self.declare_length.then_some(self.audio.len() as u64),
            chunks: futures::stream::iter(chunks).boxed(),
        })
    }
}
