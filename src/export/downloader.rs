//! Streaming download to disk with throttled progress reporting

use std::path::Path;

use futures::StreamExt;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::yandex::{AudioStream, MusicApi};

/// Largest slice written to disk in one call
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Minimum advance, in percentage points, between progress reports
pub const PROGRESS_STEP: f64 = 0.5;

/// Decides which progress values are worth reporting
///
/// Reports when progress moved at least `step` points since the last report,
/// and once on reaching 100%.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    step: f64,
    last: Option<f64>,
}

impl ProgressThrottle {
    pub fn new(step: f64) -> Self {
        Self { step, last: None }
    }

    pub fn should_report(&mut self, percent: f64) -> bool {
        let report = match self.last {
            None => true,
            Some(last) if last >= 100.0 => false,
            Some(last) => percent - last >= self.step || percent >= 100.0,
        };
        if report {
            self.last = Some(percent);
        }
        report
    }
}

/// Streams media URLs into files
pub struct Downloader<'a> {
    api: &'a dyn MusicApi,
    chunk_size: usize,
    progress_step: f64,
}

impl<'a> Downloader<'a> {
    pub fn new(api: &'a dyn MusicApi, chunk_size: usize, progress_step: f64) -> Self {
        Self {
            api,
            chunk_size: chunk_size.max(1),
            progress_step,
        }
    }

    /// Download `url` into a new file at `dest`, returning the bytes written
    ///
    /// A failure part-way leaves the partial file in place.
    pub async fn download(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<u64> {
        let audio = self.api.open_audio(url).await?;
        self.write_stream(audio, dest, on_progress).await
    }

    /// Copy an audio stream into a new file at `dest`
    ///
    /// Progress is only reported when the stream declared its length.
    pub async fn write_stream(
        &self,
        audio: AudioStream,
        dest: &Path,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> Result<u64> {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dest)
            .await
            .map_err(|e| ExportError::io(dest, e))?;

        let total = audio.content_length;
        let mut chunks = audio.chunks;
        let mut throttle = ProgressThrottle::new(self.progress_step);
        let mut written: u64 = 0;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            for piece in chunk.chunks(self.chunk_size) {
                file.write_all(piece)
                    .await
                    .map_err(|e| ExportError::io(dest, e))?;
                written += piece.len() as u64;

                if let Some(total) = total {
                    let percent = (written as f64 / total as f64 * 100.0).min(100.0);
                    if throttle.should_report(percent) {
                        on_progress(percent);
                    }
                }
            }
        }

        file.flush().await.map_err(|e| ExportError::io(dest, e))?;

        if total.is_some() && throttle.should_report(100.0) {
            on_progress(100.0);
        }

        debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
