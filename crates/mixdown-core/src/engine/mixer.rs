//! Stem mixer - combines decoded stems with volume/pan/mute/solo settings
//!
//! The mix is a pure fold over the stem list: it starts as silence as long as
//! the longest stem and every contributing stem is overlaid onto the
//! accumulator at frame 0, each step producing a new buffer.

use serde::{Deserialize, Serialize};

use crate::dsp::{apply_pan, apply_volume, overlay};
use crate::error::{MixdownError, Result};
use crate::types::AudioBuffer;

/// Per-stem mixer settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixChannelSetting {
    /// Linear volume multiplier (1.0 = unity)
    pub volume: f32,
    /// Stereo position (-1.0 = full left, 0.0 = centre, 1.0 = full right)
    pub pan: f32,
    /// Muted stems contribute nothing
    pub mute: bool,
    /// When any stem is soloed, only soloed stems contribute
    pub solo: bool,
}

impl Default for MixChannelSetting {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pan: 0.0,
            mute: false,
            solo: false,
        }
    }
}

impl MixChannelSetting {
    /// Check the setting is usable (pan within [-1, 1])
    pub fn validate(&self) -> Result<()> {
        if !(-1.0..=1.0).contains(&self.pan) {
            return Err(MixdownError::invalid(format!(
                "pan {} outside [-1.0, 1.0]",
                self.pan
            )));
        }
        Ok(())
    }
}

/// Mix stems into a single buffer
///
/// `settings[i]` applies to `stems[i]`; stems without an entry use
/// [`MixChannelSetting::default`]. The result has the longest stem's length,
/// sample rate and sample width. Stems must already share a sample rate.
pub fn mix(stems: &[AudioBuffer], settings: &[MixChannelSetting]) -> Result<AudioBuffer> {
    let longest = stems
        .iter()
        .reduce(|a, b| if b.frames() > a.frames() { b } else { a })
        .ok_or_else(|| MixdownError::invalid("no stems provided"))?;

    if let Some(stem) = stems.iter().find(|s| s.sample_rate() != longest.sample_rate()) {
        return Err(MixdownError::invalid(format!(
            "stems must share a sample rate ({} Hz vs {} Hz)",
            stem.sample_rate(),
            longest.sample_rate()
        )));
    }

    for setting in settings {
        setting.validate()?;
    }

    let has_solo = settings.iter().any(|s| s.solo);
    let default_setting = MixChannelSetting::default();

    let silence = AudioBuffer::silence(
        longest.sample_rate(),
        longest.layout(),
        longest.width(),
        longest.frames(),
    );

    log::info!(
        "Mixing {} stems ({} frames @ {} Hz, solo active: {})",
        stems.len(),
        longest.frames(),
        longest.sample_rate(),
        has_solo
    );

    stems
        .iter()
        .enumerate()
        .try_fold(silence, |mixed, (index, stem)| {
            let setting = settings.get(index).unwrap_or(&default_setting);
            match prepare_stem(stem, setting, has_solo)? {
                Some(processed) => overlay(&mixed, &processed),
                None => {
                    log::debug!("Stem {} excluded (mute: {}, solo: {})", index, setting.mute, setting.solo);
                    Ok(mixed)
                }
            }
        })
}

/// Apply one stem's settings, or `None` if the stem is excluded from the mix
fn prepare_stem(
    stem: &AudioBuffer,
    setting: &MixChannelSetting,
    has_solo: bool,
) -> Result<Option<AudioBuffer>> {
    if setting.mute {
        return Ok(None);
    }
    if has_solo && !setting.solo {
        return Ok(None);
    }

    let stem = apply_volume(stem, setting.volume);
    let stem = apply_pan(&stem, setting.pan)?;
    Ok(Some(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelLayout, SampleWidth};

    fn mono(level: f32, frames: usize) -> AudioBuffer {
        AudioBuffer::new(48000, ChannelLayout::Mono, SampleWidth::Int16, vec![level; frames]).unwrap()
    }

    #[test]
    fn test_empty_stems_rejected() {
        assert!(matches!(mix(&[], &[]), Err(MixdownError::InvalidInput(_))));
    }

    #[test]
    fn test_length_is_longest_stem() {
        let stems = vec![mono(0.1, 300), mono(0.1, 1200), mono(0.1, 50)];
        let out = mix(&stems, &[]).unwrap();
        assert_eq!(out.frames(), 1200);
    }

    #[test]
    fn test_constant_and_silent_stem_scenario() {
        let stems = vec![mono(0.5, 1000), mono(0.0, 2000)];
        let settings = vec![MixChannelSetting::default(); 2];
        let out = mix(&stems, &settings).unwrap();

        assert_eq!(out.frames(), 2000);
        assert!(out.samples()[..1000].iter().all(|&s| s == 0.5));
        assert!(out.samples()[1000..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_all_muted_is_silent() {
        let stems = vec![mono(0.5, 100), mono(0.3, 400)];
        let muted = MixChannelSetting {
            mute: true,
            ..Default::default()
        };
        let out = mix(&stems, &[muted, muted]).unwrap();
        assert_eq!(out.frames(), 400);
        assert!(out.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_solo_suppresses_others() {
        let stems = vec![mono(0.5, 10), mono(0.25, 10), mono(0.125, 10)];
        let solo = MixChannelSetting {
            solo: true,
            ..Default::default()
        };
        let out = mix(&stems, &[MixChannelSetting::default(), solo]).unwrap();
        assert!(out.samples().iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_muted_solo_stem_still_excluded() {
        let stems = vec![mono(0.5, 10), mono(0.25, 10)];
        let muted_solo = MixChannelSetting {
            solo: true,
            mute: true,
            ..Default::default()
        };
        let solo = MixChannelSetting {
            solo: true,
            ..Default::default()
        };
        let out = mix(&stems, &[muted_solo, solo]).unwrap();
        assert!(out.samples().iter().all(|&s| s == 0.25));
    }

    #[test]
    fn test_solo_on_setting_past_last_stem_silences_mix() {
        let stems = vec![mono(0.5, 10), mono(0.25, 10)];
        let solo = MixChannelSetting {
            solo: true,
            ..Default::default()
        };
        let settings = [MixChannelSetting::default(), MixChannelSetting::default(), solo];
        let out = mix(&stems, &settings).unwrap();
        assert_eq!(out.frames(), 10);
        assert!(out.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        let stems = vec![mono(0.25, 10), mono(0.25, 10)];
        let out = mix(&stems, &[MixChannelSetting::default()]).unwrap();
        assert!(out.samples().iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_volume_applied() {
        let stems = vec![mono(0.5, 10)];
        let half = MixChannelSetting {
            volume: 0.5,
            ..Default::default()
        };
        let out = mix(&stems, &[half]).unwrap();
        assert!(out.samples().iter().all(|&s| (s - 0.25).abs() < 1e-5));
    }

    #[test]
    fn test_pan_produces_stereo_mix() {
        let stems = vec![mono(0.5, 10)];
        let left = MixChannelSetting {
            pan: -1.0,
            ..Default::default()
        };
        let out = mix(&stems, &[left]).unwrap();
        assert_eq!(out.layout(), ChannelLayout::Stereo);
        assert_eq!(out.frames(), 10);
        for frame in out.frames_iter() {
            assert!(frame[0] > 0.5);
            assert!(frame[1].abs() < 1e-6);
        }
    }

    #[test]
    fn test_invalid_pan_rejected() {
        let stems = vec![mono(0.5, 10)];
        let bad = MixChannelSetting {
            pan: -2.0,
            ..Default::default()
        };
        assert!(matches!(mix(&stems, &[bad]), Err(MixdownError::InvalidInput(_))));
    }

    #[test]
    fn test_sample_rate_mismatch_rejected() {
        let other = AudioBuffer::new(44100, ChannelLayout::Mono, SampleWidth::Int16, vec![0.1; 10]).unwrap();
        assert!(mix(&[mono(0.1, 10), other], &[]).is_err());
    }
}
