//! ID3v2 tag writing for downloaded MP3 files

use std::fs::File;
use std::path::Path;

use lofty::config::{ParseOptions, WriteOptions};
use lofty::id3::v2::{ExtendedUrlFrame, Frame, Id3v2Tag};
use lofty::mpeg::MpegFile;
use lofty::prelude::*;
use lofty::TextEncoding;
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::yandex::Track;

/// Description of the user-defined URL frame that carries the cover link
pub const COVER_URL_DESCRIPTION: &str = "Cover Art URL";

/// Tag values derived from a track, with album fallbacks already applied
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<u32>,
    pub track_number: Option<u32>,
    pub track_total: Option<u32>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
}

impl TrackTags {
    pub fn from_track(track: &Track) -> Self {
        let album = track.first_album();
        let track_number = track.track_number.filter(|n| *n > 0);

        Self {
            title: Some(track.title.clone()).filter(|t| !t.is_empty()),
            artist: Some(track.artist_names()).filter(|a| !a.is_empty()),
            album: album
                .and_then(|a| a.title.clone())
                .filter(|t| !t.is_empty()),
            year: track.resolved_year(),
            track_number,
            track_total: track_number
                .and(album.and_then(|a| a.track_count))
                .filter(|n| *n > 0),
            genre: track.resolved_genre().map(str::to_string),
            cover_url: track.resolved_cover().map(absolute_cover_url),
        }
    }

    /// TRCK text: `N`, or `N/total` when the album size is known
    pub fn track_text(&self) -> Option<String> {
        let number = self.track_number?;
        Some(match self.track_total {
            Some(total) => format!("{number}/{total}"),
            None => number.to_string(),
        })
    }

    fn apply(&self, tag: &mut Id3v2Tag) {
        if let Some(title) = &self.title {
            tag.set_title(title.clone());
        }
        if let Some(artist) = &self.artist {
            tag.set_artist(artist.clone());
        }
        if let Some(album) = &self.album {
            tag.set_album(album.clone());
        }
        if let Some(year) = self.year {
            tag.set_year(year);
        }
        if let Some(number) = self.track_number {
            tag.set_track(number);
            if let Some(total) = self.track_total {
                tag.set_track_total(total);
            }
        }
        if let Some(genre) = &self.genre {
            tag.set_genre(genre.clone());
        }
        if let Some(url) = &self.cover_url {
            tag.insert(Frame::UserUrl(ExtendedUrlFrame::new(
                TextEncoding::UTF8,
                COVER_URL_DESCRIPTION.to_string(),
                url.clone(),
            )));
        }
    }
}

/// Turn a scheme-less cover reference into an https URL
///
/// Cover references look like `avatars.yandex.net/get-music-content/.../%%`
/// or `//avatars...`; ones that already carry a scheme are kept.
pub fn absolute_cover_url(reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        reference.to_string()
    } else {
        format!("https://{}", reference.trim_start_matches("//"))
    }
}

/// Write tags for `track` into the MP3 at `path`
///
/// Blocking; run it off the async runtime.
pub fn write_tags(path: &Path, track: &Track) -> Result<()> {
    let mut file = File::open(path)
        .map_err(|e| ExportError::Tag(format!("cannot open {}: {e}", path.display())))?;
    let mut mpeg = MpegFile::read_from(&mut file, ParseOptions::new())?;
    drop(file);

    if mpeg.id3v2().is_none() {
        mpeg.set_id3v2(Id3v2Tag::new());
    }
    let tag = mpeg
        .id3v2_mut()
        .ok_or_else(|| ExportError::Tag("could not create ID3v2 tag".to_string()))?;

    let tags = TrackTags::from_track(track);
    tags.apply(tag);

    mpeg.save_to_path(path, WriteOptions::default())?;

    debug!(
        "Wrote tags to {} (track {})",
        path.display(),
        tags.track_text().unwrap_or_else(|| "-".to_string())
    );
    Ok(())
}
