//! Tag embedding for encoded files (lofty)
//!
//! FLAC gets Vorbis comments, WAV gets an ID3v2 chunk. Only title, artist,
//! album, year and genre are written; empty values are dropped.

use std::collections::HashMap;
use std::path::Path;

use lofty::config::WriteOptions;
use lofty::tag::{ItemKey, Tag, TagExt, TagType};

use super::EncodeFormat;
use crate::error::{MixdownError, Result};

/// Descriptive tags for an encoded file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub genre: Option<String>,
}

impl TrackMetadata {
    /// Pick the supported keys out of a request's metadata map
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            map.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        for key in map.keys() {
            if !matches!(key.as_str(), "title" | "artist" | "album" | "year" | "genre") {
                log::debug!("Ignoring unsupported metadata key '{}'", key);
            }
        }
        Self {
            title: get("title"),
            artist: get("artist"),
            album: get("album"),
            year: get("year"),
            genre: get("genre"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    fn items(&self) -> impl Iterator<Item = (ItemKey, &str)> {
        [
            (ItemKey::TrackTitle, &self.title),
            (ItemKey::TrackArtist, &self.artist),
            (ItemKey::AlbumTitle, &self.album),
            (ItemKey::RecordingDate, &self.year),
            (ItemKey::Genre, &self.genre),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }
}

/// Write `metadata` into the encoded file at `path`
///
/// Does nothing when there is nothing to write.
pub fn write_tags(path: &Path, format: EncodeFormat, metadata: &TrackMetadata) -> Result<()> {
    if metadata.is_empty() {
        return Ok(());
    }

    let tag_type = match format {
        EncodeFormat::Wav => TagType::Id3v2,
        EncodeFormat::Flac => TagType::VorbisComments,
    };

    let mut tag = Tag::new(tag_type);
    for (key, value) in metadata.items() {
        if !tag.insert_text(key.clone(), value.to_string()) {
            log::warn!("{:?} cannot hold {:?}, skipped", tag_type, key);
        }
    }

    tag.save_to_path(path, WriteOptions::default())
        .map_err(|e| MixdownError::Encode(format!("writing tags: {}", e)))?;
    log::debug!("Wrote {} tags to {:?}", tag.item_count(), path);
    Ok(())
}
