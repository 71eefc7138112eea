//! Batch export orchestration
//!
//! Runs each track of a catalog through link resolution, download and tagging,
//! strictly one after another. A failing track is counted and the batch moves
//! on; only the setup (creating the destination folder) can abort a run.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{debug, info, warn};

use super::downloader::{CHUNK_SIZE, Downloader, PROGRESS_STEP};
use super::resolver::LinkResolver;
use super::tagger;
use crate::error::{ExportError, Result};
use crate::utils::sanitize_filename;
use crate::yandex::{MusicApi, Track};

/// What happened to a single track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Downloaded,
    /// A file with the target name already existed
    Skipped,
    Failed,
}

/// Per-outcome counts for one batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchOutcome {
    pub fn record(&mut self, outcome: TrackOutcome) {
        match outcome {
            TrackOutcome::Downloaded => self.downloaded += 1,
            TrackOutcome::Skipped => self.skipped += 1,
            TrackOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

/// Settings for one export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Folder the MP3 files are written to
    pub destination: PathBuf,
    pub chunk_size: usize,
    /// Minimum progress advance, in percentage points, between bar updates
    pub progress_step: f64,
    /// Draw a progress bar per track
    pub show_progress: bool,
}

impl ExportOptions {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
            chunk_size: CHUNK_SIZE,
            progress_step: PROGRESS_STEP,
            show_progress: true,
        }
    }

    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }
}

/// File name for a track: `{artist}-{title}.mp3`, sanitized
pub fn track_file_name(track: &Track) -> String {
    sanitize_filename(&format!("{}-{}.mp3", track.display_artist(), track.title))
}

/// Export engine for a single destination folder
pub struct ExportEngine<'a> {
    resolver: LinkResolver<'a>,
    downloader: Downloader<'a>,
    options: ExportOptions,
}

impl<'a> ExportEngine<'a> {
    pub fn new(api: &'a dyn MusicApi, options: ExportOptions) -> Self {
        Self {
            resolver: LinkResolver::new(api),
            downloader: Downloader::new(api, options.chunk_size, options.progress_step),
            options,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.options.destination
    }

    /// Create the destination folder, including parents
    pub async fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.options.destination)
            .await
            .map_err(|e| ExportError::io(&self.options.destination, e))?;

        debug!(
            "Prepared destination folder {}",
            self.options.destination.display()
        );
        Ok(())
    }

    /// Export every track in catalog order and return the counts
    pub async fn run(&self, tracks: &[Track]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for (index, track) in tracks.iter().enumerate() {
            let position = format!("[{}/{}]", index + 1, tracks.len());
            outcome.record(self.export_track(&position, track).await);
        }

        info!(
            "Export finished: {} downloaded, {} skipped, {} failed",
            outcome.downloaded, outcome.skipped, outcome.failed
        );
        outcome
    }

    async fn export_track(&self, position: &str, track: &Track) -> TrackOutcome {
        let label = format!("{} — {}", track.title, track.display_artist());
        let file_name = track_file_name(track);
        let path = self.options.destination.join(&file_name);

        if fs::try_exists(&path).await.unwrap_or(false) {
            info!("{} Skipped (already exists): {}", position, label);
            return TrackOutcome::Skipped;
        }

        let Some(track_id) = track.canonical_id() else {
            warn!("{} Track has no id: {}", position, label);
            return TrackOutcome::Failed;
        };

        let url = match self.resolver.resolve(&track_id).await {
            Ok(url) => url,
            Err(e) => {
                warn!("{} Failed to get link: {} ({})", position, label, e);
                return TrackOutcome::Failed;
            }
        };

        let bar = self.progress_bar(position, &label);
        let result = self
            .downloader
            .download(&url, &path, &mut |percent| {
                bar.set_position(percent as u64);
                bar.set_message(format!("{percent:.1}%"));
            })
            .await;
        bar.finish_and_clear();

        if let Err(e) = result {
            warn!("{} Download failed: {} ({})", position, label, e);
            return TrackOutcome::Failed;
        }

        self.tag(position, &label, &path, track).await;

        info!("{} ✓ Saved: {}", position, file_name);
        TrackOutcome::Downloaded
    }

    /// Write tags; failures only warn, the file still counts as downloaded
    async fn tag(&self, position: &str, label: &str, path: &Path, track: &Track) {
        let path = path.to_path_buf();
        let track = track.clone();

        match tokio::task::spawn_blocking(move || tagger::write_tags(&path, &track)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("{} Could not write tags for {} ({})", position, label, e),
            Err(e) => warn!("{} Tagging task failed for {} ({})", position, label, e),
        }
    }

    fn progress_bar(&self, position: &str, label: &str) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template("{prefix} {wide_msg:.dim} [{bar:30.cyan/blue}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        bar.set_prefix(format!("{position} {label}"));
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::testing::FakeApi;
    use crate::yandex::{Artist, Identifier};

    fn track(id: i64, artist: &str, title: &str) -> Track {
        Track {
            id: Some(Identifier::Integer(id)),
            title: title.to_string(),
            artists: vec![Artist {
                name: artist.to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_track_file_name() {
        assert_eq!(
            track_file_name(&track(1, "AC/DC", "T.N.T.")),
            "AC_DC-T.N.T..mp3"
        );
        assert_eq!(
            track_file_name(&Track {
                title: "What?".to_string(),
                ..Default::default()
            }),
            "Unknown Artist-What_.mp3"
        );
    }

    #[test]
    fn test_batch_outcome_counts() {
        let mut outcome = BatchOutcome::default();
        outcome.record(TrackOutcome::Downloaded);
        outcome.record(TrackOutcome::Skipped);
        outcome.record(TrackOutcome::Failed);
        outcome.record(TrackOutcome::Downloaded);
        assert_eq!(
            outcome,
            BatchOutcome {
                downloaded: 2,
                skipped: 1,
                failed: 1
            }
        );
        assert_eq!(outcome.total(), 4);
    }

    #[tokio::test]
    async fn test_prepare_creates_nested_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("a").join("b");
        let api = FakeApi::default();
        let engine = ExportEngine::new(&api, ExportOptions::new(&dest).quiet());

        engine.prepare().await.unwrap();
        assert!(dest.is_dir());
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let existing = track(1, "Artist", "Song");
        std::fs::write(dir.path().join(track_file_name(&existing)), b"partial").unwrap();

        let api = FakeApi::default();
        let engine = ExportEngine::new(&api, ExportOptions::new(dir.path()).quiet());
        let outcome = engine.run(&[existing]).await;

        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.total(), 1);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_link_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi {
            no_variants: vec!["2".to_string()],
            ..Default::default()
        };
        let engine = ExportEngine::new(&api, ExportOptions::new(dir.path()).quiet());

        let tracks = [
            track(1, "Artist", "One"),
            track(2, "Artist", "Two"),
            track(3, "Artist", "Three"),
        ];
        let outcome = engine.run(&tracks).await;

        assert_eq!(
            outcome,
            BatchOutcome {
                downloaded: 2,
                skipped: 0,
                failed: 1
            }
        );
        assert!(dir.path().join("Artist-One.mp3").exists());
        assert!(!dir.path().join("Artist-Two.mp3").exists());
        assert!(dir.path().join("Artist-Three.mp3").exists());
        assert_eq!(api.calls("open_audio"), 2);
    }

    #[tokio::test]
    async fn test_broken_stream_fails_track_and_leaves_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi {
            broken_streams: vec!["2".to_string()],
            ..Default::default()
        };
        let engine = ExportEngine::new(&api, ExportOptions::new(dir.path()).quiet());
        let tracks = [
            track(1, "Artist", "One"),
            track(2, "Artist", "Two"),
            track(3, "Artist", "Three"),
        ];

        let first = engine.run(&tracks).await;
        assert_eq!(
            first,
            BatchOutcome {
                downloaded: 2,
                skipped: 0,
                failed: 1
            }
        );
        let partial = dir.path().join("Artist-Two.mp3");
        assert_eq!(std::fs::metadata(&partial).unwrap().len(), 1000);

        // Existence alone decides skipping, so the partial file is kept as is
        let second = engine.run(&tracks).await;
        assert_eq!(
            second,
            BatchOutcome {
                downloaded: 0,
                skipped: 3,
                failed: 0
            }
        );
        assert_eq!(std::fs::metadata(&partial).unwrap().len(), 1000);
        assert_eq!(api.calls("open_audio"), 3);
    }

    #[tokio::test]
    async fn test_tag_failure_still_counts_as_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi {
            audio: b"not an mp3 at all".to_vec(),
            ..Default::default()
        };
        let engine = ExportEngine::new(&api, ExportOptions::new(dir.path()).quiet());

        let outcome = engine.run(&[track(5, "Artist", "Song")]).await;
        assert_eq!(outcome.downloaded, 1);
        assert_eq!(
            std::fs::read(dir.path().join("Artist-Song.mp3")).unwrap(),
            b"not an mp3 at all"
        );
    }

    #[tokio::test]
    async fn test_track_without_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::default();
        let engine = ExportEngine::new(&api, ExportOptions::new(dir.path()).quiet());

        let anonymous = Track {
            title: "Nameless".to_string(),
            ..Default::default()
        };
        let outcome = engine.run(&[anonymous]).await;
        assert_eq!(outcome.failed, 1);
        assert_eq!(api.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_second_run_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::default();
        let engine = ExportEngine::new(&api, ExportOptions::new(dir.path()).quiet());
        let tracks = [track(1, "A", "One"), track(2, "B", "Two")];

        assert_eq!(engine.run(&tracks).await.downloaded, 2);
        let second = engine.run(&tracks).await;
        assert_eq!(second.skipped, 2);
        assert_eq!(second.downloaded, 0);
    }
}
