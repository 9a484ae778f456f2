//! Vocal take combination and overlay onto the stem mix

use serde::{Deserialize, Serialize};

use crate::dsp::{apply_volume, overlay};
use crate::error::Result;
use crate::types::AudioBuffer;

/// Per-take vocal settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocalTakeSetting {
    /// Linear volume multiplier (1.0 = unity)
    pub volume: f32,
}

impl Default for VocalTakeSetting {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

/// Combine vocal takes into one buffer
///
/// Returns `None` when there are no takes. Otherwise each take gets its own
/// volume and the takes are overlaid in order, the first take being the base.
/// A later take longer than the running result extends it.
pub fn combine_vocals(
    takes: &[AudioBuffer],
    settings: &[VocalTakeSetting],
) -> Result<Option<AudioBuffer>> {
    let default_setting = VocalTakeSetting::default();
    let mut combined: Option<AudioBuffer> = None;

    for (index, take) in takes.iter().enumerate() {
        let setting = settings.get(index).unwrap_or(&default_setting);
        let take = apply_volume(take, setting.volume);
        combined = Some(match combined {
            Some(base) => overlay(&base, &take)?,
            None => take,
        });
    }

    if let Some(vocals) = &combined {
        log::info!("Combined {} vocal takes ({} frames)", takes.len(), vocals.frames());
    }
    Ok(combined)
}

/// Overlay combined vocals onto the mix at frame 0
pub fn overlay_vocals(mix: &AudioBuffer, vocals: Option<&AudioBuffer>) -> Result<AudioBuffer> {
    match vocals {
        Some(vocals) => overlay(mix, vocals),
        None => Ok(mix.clone()),
    }
}
