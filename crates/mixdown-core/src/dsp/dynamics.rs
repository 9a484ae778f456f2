//! Static dynamics processing: compressor, peak normalizer, uniform limiter
//!
//! None of these model attack or release. Each is a pure function of the
//! input buffer, so identical input always yields identical output.

use super::gain::{db_to_linear, linear_to_db};
use crate::types::AudioBuffer;

/// Static downward compressor
///
/// The envelope is the per-frame peak across channels. For a frame whose
/// level is above `threshold_db`, the excess is divided by `ratio` and the
/// whole frame is scaled by the resulting gain reduction, which keeps the
/// stereo image intact. Frames at or below the threshold are untouched.
pub fn compress(buffer: &AudioBuffer, threshold_db: f32, ratio: f32) -> AudioBuffer {
    if ratio <= 1.0 {
        return buffer.clone();
    }

    let mut samples = Vec::with_capacity(buffer.samples().len());
    for frame in buffer.frames_iter() {
        let level = frame.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        let level_db = linear_to_db(level);

        if level_db > threshold_db {
            let out_db = threshold_db + (level_db - threshold_db) / ratio;
            let gain = db_to_linear(out_db - level_db);
            samples.extend(frame.iter().map(|s| s * gain));
        } else {
            samples.extend_from_slice(frame);
        }
    }
    buffer.with_samples(samples)
}

/// Scale the buffer uniformly so its peak sample reaches 0 dBFS
///
/// Silent buffers are returned unchanged.
pub fn normalize(buffer: &AudioBuffer) -> AudioBuffer {
    let peak = buffer.peak();
    if peak <= 0.0 {
        return buffer.clone();
    }
    buffer.scaled(1.0 / peak)
}

/// Uniform peak limiter
///
/// If the buffer's peak exceeds `threshold_db`, the whole buffer is turned
/// down by the excess so the peak lands exactly on the threshold.
pub fn limit(buffer: &AudioBuffer, threshold_db: f32) -> AudioBuffer {
    let peak_db = linear_to_db(buffer.peak());
    if peak_db > threshold_db {
        buffer.scaled(db_to_linear(threshold_db - peak_db))
    } else {
        buffer.clone()
    }
}
