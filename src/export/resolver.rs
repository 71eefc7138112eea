//! Two-stage media link resolution
//!
//! 1. `tracks/{id}/download-info` lists quality/format variants; the first one
//!    is taken as-is and its descriptor URL followed.
//! 2. The descriptor document gives host, path, timestamp and signature, which
//!    compose the final streamable URL.
//!
//! Nothing is cached: each track runs both stages.

use tracing::debug;

use crate::error::{ExportError, Result};
use crate::yandex::{DownloadDescriptor, MusicApi};

/// Resolves track ids to signed, time-limited media URLs
pub struct LinkResolver<'a> {
    api: &'a dyn MusicApi,
}

impl<'a> LinkResolver<'a> {
    pub fn new(api: &'a dyn MusicApi) -> Self {
        Self { api }
    }

    /// Resolve the media URL for a track by canonical id
    pub async fn resolve(&self, track_id: &str) -> Result<String> {
        let descriptor_url = self.descriptor_url(track_id).await?;
        let descriptor = self.descriptor(&descriptor_url).await?;

        let url = descriptor.media_url();
        debug!("Resolved track {} to {}", track_id, url);
        Ok(url)
    }

    async fn descriptor_url(&self, track_id: &str) -> Result<String> {
        let variants = self.api.download_variants(track_id).await?;

        let first = variants.into_iter().next().ok_or_else(|| {
            ExportError::NoRendition(format!("no download variants for track {track_id}"))
        })?;

        debug!(
            "Using variant {} {}kbps for track {}",
            first.codec.as_deref().unwrap_or("?"),
            first.bitrate_in_kbps.unwrap_or_default(),
            track_id
        );

        if first.download_info_url.is_empty() {
            return Err(ExportError::NoRendition(format!(
                "empty download link for track {track_id}"
            )));
        }

        Ok(first.download_info_url)
    }

    async fn descriptor(&self, url: &str) -> Result<DownloadDescriptor> {
        let body = self
            .api
            .fetch_descriptor(url)
            .await
            .map_err(|e| ExportError::Descriptor(e.to_string()))?;

        DownloadDescriptor::parse(&body)
    }
}
