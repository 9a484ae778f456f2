//! Post-master measurements
//!
//! The loudness value is a plain RMS figure with the BS.1770 offset applied.
//! There is no K-weighting and no gating, so it only approximates LUFS.

use serde::{Deserialize, Serialize};

use crate::dsp::linear_to_db;
use crate::types::AudioBuffer;

/// Loudness reported for digital silence
pub const SILENCE_LUFS: f64 = -70.0;

/// Offset applied to the RMS level (dB)
const LUFS_OFFSET_DB: f64 = -0.691;

/// Measurements taken on a mastered buffer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasterMetrics {
    pub duration_seconds: f64,
    /// Sample peak in dBFS (negative infinity for silence)
    pub peak_db: f32,
    /// Approximate loudness, rounded to one decimal
    pub loudness_lufs: f64,
}

impl MasterMetrics {
    pub fn measure(buffer: &AudioBuffer) -> Self {
        Self {
            duration_seconds: buffer.duration_seconds(),
            peak_db: peak_db(buffer),
            loudness_lufs: loudness_lufs(buffer),
        }
    }
}

/// A mastered buffer together with its measurements
#[derive(Debug, Clone, PartialEq)]
pub struct MasterResult {
    pub buffer: AudioBuffer,
    pub metrics: MasterMetrics,
}

/// Sample peak in dBFS
pub fn peak_db(buffer: &AudioBuffer) -> f32 {
    linear_to_db(buffer.peak())
}

/// RMS over every sample in dB with the LUFS offset, rounded to 0.1
///
/// Returns [`SILENCE_LUFS`] when the RMS is zero (including empty buffers).
pub fn loudness_lufs(buffer: &AudioBuffer) -> f64 {
    let samples = buffer.samples();
    if samples.is_empty() {
        return SILENCE_LUFS;
    }

    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();
    if rms <= 0.0 {
        return SILENCE_LUFS;
    }

    let lufs = 20.0 * rms.log10() + LUFS_OFFSET_DB;
    (lufs * 10.0).round() / 10.0
}
