//! Request and response messages for the mastering, encode and archive services
//!
//! These are the documents the CLI reads (YAML or JSON) and prints (JSON).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::{MixChannelSetting, VocalTakeSetting};
use crate::types::DEFAULT_SAMPLE_RATE;

fn default_profile() -> String {
    "clean".to_string()
}

fn default_volume() -> f32 {
    1.0
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_bit_depth() -> u32 {
    24
}

/// Mix, master and store a set of stems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRequest {
    pub stem_urls: Vec<String>,
    /// Mixer settings by position; stems past the end use defaults
    #[serde(default)]
    pub mix_settings: Vec<MixChannel>,
    /// Profile name; unknown names master with `clean`
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub vocal_takes: Vec<VocalTake>,
    /// Storage key the master is uploaded under
    pub output_key: String,
}

/// Mixer settings for one stem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixChannel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stem_url: Option<String>,
    #[serde(flatten)]
    pub setting: MixChannelSetting,
}

/// A vocal take to blend over the mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocalTake {
    pub url: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl MasterRequest {
    /// Mixer settings in request order, `mix_settings[i]` applying to `stem_urls[i]`
    ///
    /// Every channel is returned, including ones past the last stem, so a
    /// solo anywhere in the request still silences the other stems. A
    /// channel's `stem_url` is informational; a mismatch is only logged.
    pub fn channel_settings(&self) -> Vec<MixChannelSetting> {
        for (index, channel) in self.mix_settings.iter().enumerate() {
            if let Some(url) = channel.stem_url.as_deref() {
                if self.stem_urls.get(index).map(String::as_str) != Some(url) {
                    log::warn!(
                        "Mix channel {} names {} but applies to stem {:?}",
                        index,
                        url,
                        self.stem_urls.get(index)
                    );
                }
            }
        }
        self.mix_settings.iter().map(|ch| ch.setting).collect()
    }

    /// URLs of the vocal takes, in order
    pub fn vocal_urls(&self) -> Vec<String> {
        self.vocal_takes.iter().map(|t| t.url.clone()).collect()
    }

    /// Settings of the vocal takes, in order
    pub fn vocal_settings(&self) -> Vec<VocalTakeSetting> {
        self.vocal_takes
            .iter()
            .map(|t| VocalTakeSetting { volume: t.volume })
            .collect()
    }
}

/// Result of a mastering request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterResponse {
    pub output_url: String,
    /// Seconds
    pub duration: f64,
    /// Sample peak in dBFS (serialized as null for silence)
    pub peak_db: f32,
    /// Approximate loudness
    pub lufs: f64,
}

/// Transcode a stored audio file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub input_url: String,
    /// `wav` or `flac`
    pub format: String,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// 16, 24 or 32; anything else encodes at 24
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u32,
    pub output_key: String,
    /// Tags to embed: `title`, `artist`, `album`, `year`, `genre`
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Result of an encode request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub output_url: String,
    pub format: String,
    /// Encoded size in bytes
    pub size: u64,
}

/// One file to put in an archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    #[serde(default)]
    pub url: String,
    /// Name inside the archive
    #[serde(default)]
    pub filename: String,
}

/// Package stored files into a zip archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipRequest {
    pub files: Vec<ArchiveEntry>,
    pub output_key: String,
}

/// Result of an archive request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipResponse {
    pub output_url: String,
    /// Archive size in bytes
    pub size: u64,
    /// Entries actually written to the archive
    pub file_count: usize,
}
