//! Whole-buffer sample rate conversion (rubato sinc resampler)
//!
//! Used at the pipeline edges only: to conform decoded inputs to the working
//! rate and to honour an encode target's rate. The mixer never resamples.

use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

use crate::error::{MixdownError, Result};
use crate::types::{AudioBuffer, Sample};

/// Resample `buffer` to `target_rate`, returning a new buffer
///
/// The output is trimmed to `round(frames * target / source)` frames with the
/// resampler's group delay removed, so both ends stay aligned with the input.
pub fn resample(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if target_rate == 0 {
        return Err(MixdownError::invalid("target sample rate must be positive"));
    }
    let source_rate = buffer.sample_rate();
    if source_rate == target_rate {
        return Ok(buffer.clone());
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let frames = buffer.frames();
    let expected = (frames as f64 * ratio).round() as usize;
    let channels = buffer.channels();

    if frames == 0 {
        return AudioBuffer::new(target_rate, buffer.layout(), buffer.width(), Vec::new());
    }

    log::debug!(
        "Resampling {} frames from {} Hz to {} Hz",
        frames,
        source_rate,
        target_rate
    );

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<Sample>::new(ratio, 2.0, params, frames, channels)
        .map_err(|e| MixdownError::Resample(e.to_string()))?;

    // Rubato wants one Vec per channel
    let mut waves_in: Vec<Vec<Sample>> = vec![Vec::with_capacity(frames); channels];
    for frame in buffer.frames_iter() {
        for (ch, &s) in frame.iter().enumerate() {
            waves_in[ch].push(s);
        }
    }

    let mut waves_out = resampler
        .process(&waves_in, None)
        .map_err(|e| MixdownError::Resample(e.to_string()))?;

    // Flush the filter tail so the delay trim below doesn't cut the ending short
    let tail = resampler
        .process_partial::<Vec<Sample>>(None, None)
        .map_err(|e| MixdownError::Resample(e.to_string()))?;
    for (out, rest) in waves_out.iter_mut().zip(tail) {
        out.extend(rest);
    }

    let delay = resampler.output_delay();
    let mut samples = Vec::with_capacity(expected * channels);
    for i in 0..expected {
        for wave in &waves_out {
            samples.push(wave.get(delay + i).copied().unwrap_or(0.0));
        }
    }

    AudioBuffer::new(target_rate, buffer.layout(), buffer.width(), samples)
}
