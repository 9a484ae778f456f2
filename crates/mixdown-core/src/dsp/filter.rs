//! One-pole (6dB/octave) RC filters used by the mastering EQ
//!
//! Both filters seed their state from the first frame so a DC signal passes
//! through the low-pass unchanged and the high-pass starts from the input
//! rather than ringing up from zero.

use crate::types::{AudioBuffer, Sample};

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    LowPass,
    HighPass,
}

/// Single-pole RC filter with per-channel state
#[derive(Debug, Clone)]
pub struct OnePoleFilter {
    mode: FilterMode,
    /// Smoothing coefficient derived from cutoff and sample rate
    alpha: Sample,
    /// Last output per channel
    last_out: Vec<Sample>,
    /// Last input per channel (high-pass only)
    last_in: Vec<Sample>,
    primed: bool,
}

impl OnePoleFilter {
    /// Create a filter for `channels` interleaved channels
    pub fn new(mode: FilterMode, cutoff_hz: f32, sample_rate: u32, channels: usize) -> Self {
        let rc = 1.0 / (cutoff_hz as f64 * 2.0 * std::f64::consts::PI);
        let dt = 1.0 / sample_rate as f64;
        let alpha = match mode {
            FilterMode::LowPass => dt / (rc + dt),
            FilterMode::HighPass => rc / (rc + dt),
        };
        Self {
            mode,
            alpha: alpha as Sample,
            last_out: vec![0.0; channels],
            last_in: vec![0.0; channels],
            primed: false,
        }
    }

    pub fn low_pass(cutoff_hz: f32, sample_rate: u32, channels: usize) -> Self {
        Self::new(FilterMode::LowPass, cutoff_hz, sample_rate, channels)
    }

    pub fn high_pass(cutoff_hz: f32, sample_rate: u32, channels: usize) -> Self {
        Self::new(FilterMode::HighPass, cutoff_hz, sample_rate, channels)
    }

    /// Process one interleaved frame in place
    #[inline]
    pub fn process_frame(&mut self, frame: &mut [Sample]) {
        if !self.primed {
            // First frame passes through and seeds the state
            self.last_out.copy_from_slice(frame);
            self.last_in.copy_from_slice(frame);
            self.primed = true;
            return;
        }

        for (ch, sample) in frame.iter_mut().enumerate() {
            let input = *sample;
            let out = match self.mode {
                FilterMode::LowPass => {
                    self.last_out[ch] + self.alpha * (input - self.last_out[ch])
                }
                FilterMode::HighPass => {
                    self.alpha * (self.last_out[ch] + input - self.last_in[ch])
                }
            };
            self.last_out[ch] = out;
            self.last_in[ch] = input;
            *sample = out;
        }
    }

    pub fn reset(&mut self) {
        self.last_out.fill(0.0);
        self.last_in.fill(0.0);
        self.primed = false;
    }
}

/// Filter a whole buffer, returning a new one
pub fn filter_buffer(buffer: &AudioBuffer, mode: FilterMode, cutoff_hz: f32) -> AudioBuffer {
    let mut filter = OnePoleFilter::new(mode, cutoff_hz, buffer.sample_rate(), buffer.channels());
    let mut samples = buffer.samples().to_vec();
    for frame in samples.chunks_exact_mut(buffer.channels()) {
        filter.process_frame(frame);
    }
    buffer.with_samples(samples)
}

/// Low-pass a buffer at `cutoff_hz`
pub fn low_pass(buffer: &AudioBuffer, cutoff_hz: f32) -> AudioBuffer {
    filter_buffer(buffer, FilterMode::LowPass, cutoff_hz)
}

/// High-pass a buffer at `cutoff_hz`
pub fn high_pass(buffer: &AudioBuffer, cutoff_hz: f32) -> AudioBuffer {
    filter_buffer(buffer, FilterMode::HighPass, cutoff_hz)
}
