//! Gain and pan primitives

use crate::error::{MixdownError, Result};
use crate::types::{AudioBuffer, Sample};

/// Smallest linear volume considered before dB conversion (-60 dB)
pub const MIN_VOLUME: f32 = 0.001;

/// Convert decibels to a linear gain factor
///
/// 0 dB = 1.0, +6 dB ≈ 2.0, -6 dB ≈ 0.5
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert a linear amplitude to decibels (-inf for zero)
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Convert a linear volume setting to a dB gain
///
/// The volume is clamped below at [`MIN_VOLUME`] so a fader at zero becomes
/// -60 dB rather than -inf.
#[inline]
pub fn volume_to_db(volume: f32) -> f32 {
    20.0 * volume.max(MIN_VOLUME).log10()
}

/// Add `db` to every sample's level
pub fn apply_gain_db(buffer: &AudioBuffer, db: f32) -> AudioBuffer {
    if db == 0.0 {
        return buffer.clone();
    }
    buffer.scaled(db_to_linear(db))
}

/// Apply a linear volume setting (unity leaves the buffer untouched)
pub fn apply_volume(buffer: &AudioBuffer, volume: f32) -> AudioBuffer {
    if volume == 1.0 {
        return buffer.clone();
    }
    apply_gain_db(buffer, volume_to_db(volume))
}

/// Per-channel linear gains `(left, right)` for a pan position
///
/// The side being panned towards is boosted by up to +3 dB (`2^(|pan|/2)`),
/// the opposite side is reduced to `2 - 2^|pan|`, which reaches silence at
/// the extremes. Centre (0.0) is unity on both sides.
pub fn pan_gains(pan: f32) -> (Sample, Sample) {
    let amount = pan.abs().min(1.0);
    let boost = 2.0_f32.powf(amount / 2.0);
    let reduce = (2.0 - 2.0_f32.powf(amount)).max(0.0);
    if pan < 0.0 {
        (boost, reduce)
    } else {
        (reduce, boost)
    }
}

/// Pan a buffer. Mono input is expanded to stereo first.
///
/// `pan` must lie in [-1, 1]: -1 = full left, +1 = full right.
pub fn apply_pan(buffer: &AudioBuffer, pan: f32) -> Result<AudioBuffer> {
    if !(-1.0..=1.0).contains(&pan) {
        return Err(MixdownError::invalid(format!(
            "pan {} outside [-1.0, 1.0]",
            pan
        )));
    }
    if pan == 0.0 {
        return Ok(buffer.clone());
    }

    let stereo = buffer.to_stereo();
    let (left_gain, right_gain) = pan_gains(pan);
    let samples = stereo
        .frames_iter()
        .flat_map(|frame| [frame[0] * left_gain, frame[1] * right_gain])
        .collect();
    Ok(stereo.with_samples(samples))
}
