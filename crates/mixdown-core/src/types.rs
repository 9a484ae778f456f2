//! Common types for mixdown
//!
//! The central value type is [`AudioBuffer`]: interleaved samples held in the
//! floating-point working domain (-1.0..1.0 = full scale) together with the
//! sample rate, channel layout and fixed-point sample width the audio was
//! decoded from (and will be encoded back to).

use serde::{Deserialize, Serialize};

use crate::error::{MixdownError, Result};

/// Working sample rate used when nothing else is configured (48kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Audio sample type in the working domain
pub type Sample = f32;

/// Channel layout of a buffer. Only mono and stereo are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    #[default]
    Mono,
    Stereo,
}

impl ChannelLayout {
    /// Map a channel count (1 or 2) to a layout
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }

    /// Number of interleaved channels
    #[inline]
    pub fn count(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// The wider of two layouts (stereo wins)
    pub fn widest(self, other: Self) -> Self {
        if self == ChannelLayout::Stereo || other == ChannelLayout::Stereo {
            ChannelLayout::Stereo
        } else {
            ChannelLayout::Mono
        }
    }
}

/// Fixed-point sample width (bytes per sample)
///
/// Ordered by resolution so `max()` picks the wider width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum SampleWidth {
    /// 16-bit (2 bytes)
    #[default]
    Int16,
    /// 24-bit (3 bytes)
    Int24,
    /// 32-bit (4 bytes)
    Int32,
}

impl SampleWidth {
    /// Width from a byte count (2, 3 or 4)
    pub fn from_bytes(bytes: usize) -> Option<Self> {
        match bytes {
            2 => Some(SampleWidth::Int16),
            3 => Some(SampleWidth::Int24),
            4 => Some(SampleWidth::Int32),
            _ => None,
        }
    }

    /// Width from a bit depth (16, 24 or 32)
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            16 => Some(SampleWidth::Int16),
            24 => Some(SampleWidth::Int24),
            32 => Some(SampleWidth::Int32),
            _ => None,
        }
    }

    /// Width for a requested output bit depth; unknown depths fall back to 24-bit
    pub fn from_bit_depth_or_default(bits: u32) -> Self {
        Self::from_bits(bits).unwrap_or_else(|| {
            log::warn!("Unsupported bit depth {}, falling back to 24-bit", bits);
            SampleWidth::Int24
        })
    }

    /// Bytes per sample
    #[inline]
    pub fn bytes(&self) -> usize {
        match self {
            SampleWidth::Int16 => 2,
            SampleWidth::Int24 => 3,
            SampleWidth::Int32 => 4,
        }
    }

    /// Bits per sample
    #[inline]
    pub fn bits(&self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Magnitude of full scale in the fixed-point domain: 2^(bits - 1)
    #[inline]
    pub fn full_scale(&self) -> f64 {
        (1u64 << (self.bits() - 1)) as f64
    }

    /// Quantize a working-domain sample to this width
    ///
    /// Values beyond full scale saturate at the representable range.
    #[inline]
    pub fn quantize(&self, sample: Sample) -> i32 {
        let fs = self.full_scale();
        let scaled = (sample as f64 * fs).round();
        scaled.clamp(-fs, fs - 1.0) as i32
    }

    /// Convert a fixed-point value of this width back to the working domain
    #[inline]
    pub fn dequantize(&self, value: i32) -> Sample {
        (value as f64 / self.full_scale()) as Sample
    }
}

/// Interleaved audio buffer
///
/// Invariant: `samples.len() == frames * layout.count()`. Every pipeline stage
/// takes `&AudioBuffer` and returns a new buffer; nothing aliases across stages.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    layout: ChannelLayout,
    width: SampleWidth,
    samples: Vec<Sample>,
}

impl AudioBuffer {
    /// Create a buffer from interleaved working-domain samples
    pub fn new(
        sample_rate: u32,
        layout: ChannelLayout,
        width: SampleWidth,
        samples: Vec<Sample>,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MixdownError::invalid("sample rate must be positive"));
        }
        if samples.len() % layout.count() != 0 {
            return Err(MixdownError::invalid(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                layout.count()
            )));
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(MixdownError::invalid(format!(
                "sample {} is not finite ({})",
                index, samples[index]
            )));
        }
        Ok(Self {
            sample_rate,
            layout,
            width,
            samples,
        })
    }

    /// Create a buffer of `frames` silent frames
    pub fn silence(sample_rate: u32, layout: ChannelLayout, width: SampleWidth, frames: usize) -> Self {
        debug_assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            sample_rate,
            layout,
            width,
            samples: vec![0.0; frames * layout.count()],
        }
    }

    /// Create a buffer from fixed-point samples of the given width
    pub fn from_fixed_point(
        sample_rate: u32,
        layout: ChannelLayout,
        width: SampleWidth,
        values: &[i32],
    ) -> Result<Self> {
        let samples = values.iter().map(|&v| width.dequantize(v)).collect();
        Self::new(sample_rate, layout, width, samples)
    }

    /// Quantize the buffer to its own sample width
    pub fn to_fixed_point(&self) -> Vec<i32> {
        self.samples.iter().map(|&s| self.width.quantize(s)).collect()
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.count()
    }

    #[inline]
    pub fn width(&self) -> SampleWidth {
        self.width
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.layout.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Interleaved samples
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Consume the buffer and return its interleaved samples
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    /// Length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Largest absolute sample value across all channels
    pub fn peak(&self) -> Sample {
        self.samples.iter().fold(0.0, |acc, s| acc.max(s.abs()))
    }

    /// New buffer with every sample passed through `f`
    pub fn map_samples(&self, f: impl Fn(Sample) -> Sample) -> Self {
        self.with_samples(self.samples.iter().map(|&s| f(s)).collect())
    }

    /// New buffer with every sample multiplied by `factor`
    pub fn scaled(&self, factor: Sample) -> Self {
        self.map_samples(|s| s * factor)
    }

    /// New buffer with the same format but different samples
    ///
    /// `samples` must hold whole frames of this buffer's layout.
    pub(crate) fn with_samples(&self, samples: Vec<Sample>) -> Self {
        debug_assert_eq!(samples.len() % self.layout.count(), 0);
        Self {
            sample_rate: self.sample_rate,
            layout: self.layout,
            width: self.width,
            samples,
        }
    }

    /// Same audio tagged with another fixed-point width
    pub fn with_width(mut self, width: SampleWidth) -> Self {
        self.width = width;
        self
    }

    /// Stereo copy of this buffer (mono is duplicated into both channels)
    pub fn to_stereo(&self) -> Self {
        match self.layout {
            ChannelLayout::Stereo => self.clone(),
            ChannelLayout::Mono => Self {
                sample_rate: self.sample_rate,
                layout: ChannelLayout::Stereo,
                width: self.width,
                samples: self.samples.iter().flat_map(|&s| [s, s]).collect(),
            },
        }
    }

    /// Copy converted to `layout` (only mono -> stereo expansion is lossless)
    pub fn to_layout(&self, layout: ChannelLayout) -> Self {
        match (self.layout, layout) {
            (ChannelLayout::Mono, ChannelLayout::Stereo) => self.to_stereo(),
            (ChannelLayout::Stereo, ChannelLayout::Mono) => Self {
                sample_rate: self.sample_rate,
                layout: ChannelLayout::Mono,
                width: self.width,
                samples: self
                    .samples
                    .chunks_exact(2)
                    .map(|frame| (frame[0] + frame[1]) * 0.5)
                    .collect(),
            },
            _ => self.clone(),
        }
    }

    /// Iterate over frames (each a slice of `channels()` samples)
    pub fn frames_iter(&self) -> impl Iterator<Item = &[Sample]> {
        self.samples.chunks_exact(self.layout.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_finite_samples() {
        for bad in [f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let result = AudioBuffer::new(48000, ChannelLayout::Mono, SampleWidth::Int16, vec![0.5, bad]);
            assert!(matches!(result, Err(MixdownError::InvalidInput(_))));
        }
    }

    #[test]
    fn test_new_rejects_partial_frames() {
        let result = AudioBuffer::new(48000, ChannelLayout::Stereo, SampleWidth::Int16, vec![0.0; 3]);
        assert!(matches!(result, Err(MixdownError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_zero_sample_rate() {
        let result = AudioBuffer::new(0, ChannelLayout::Mono, SampleWidth::Int16, vec![0.0; 4]);
        assert!(result.is_err());
    }

    #[test]
    fn test_frames_and_duration() {
        let buffer = AudioBuffer::silence(1000, ChannelLayout::Stereo, SampleWidth::Int24, 500);
        assert_eq!(buffer.frames(), 500);
        assert_eq!(buffer.samples().len(), 1000);
        assert!((buffer.duration_seconds() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_point_roundtrip() {
        for width in [SampleWidth::Int16, SampleWidth::Int24, SampleWidth::Int32] {
            let values = vec![0, 1, -1, 12345, -12345];
            let buffer =
                AudioBuffer::from_fixed_point(44100, ChannelLayout::Mono, width, &values).unwrap();
            assert_eq!(buffer.to_fixed_point(), values, "width {:?}", width);
        }
    }

    #[test]
    fn test_quantize_saturates() {
        let width = SampleWidth::Int16;
        assert_eq!(width.quantize(2.0), 32767);
        assert_eq!(width.quantize(-2.0), -32768);
        assert_eq!(width.quantize(0.5), 16384);
    }

    #[test]
    fn test_width_mappings() {
        assert_eq!(SampleWidth::from_bits(24), Some(SampleWidth::Int24));
        assert_eq!(SampleWidth::from_bytes(4), Some(SampleWidth::Int32));
        assert_eq!(SampleWidth::from_bit_depth_or_default(20), SampleWidth::Int24);
        assert_eq!(SampleWidth::Int16.full_scale(), 32768.0);
        assert!(SampleWidth::Int32 > SampleWidth::Int16);
    }

    #[test]
    fn test_mono_to_stereo() {
        let mono =
            AudioBuffer::new(48000, ChannelLayout::Mono, SampleWidth::Int16, vec![0.1, 0.2]).unwrap();
        let stereo = mono.to_stereo();
        assert_eq!(stereo.layout(), ChannelLayout::Stereo);
        assert_eq!(stereo.frames(), 2);
        assert_eq!(stereo.samples(), &[0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_peak() {
        let buffer =
            AudioBuffer::new(48000, ChannelLayout::Stereo, SampleWidth::Int16, vec![0.1, -0.7, 0.3, 0.2])
                .unwrap();
        assert_eq!(buffer.peak(), 0.7);
    }
}
