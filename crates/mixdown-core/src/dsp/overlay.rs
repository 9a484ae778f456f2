//! Additive overlay of two buffers

use crate::error::{MixdownError, Result};
use crate::types::AudioBuffer;

/// Sum `top` onto `base`, both aligned at frame 0
///
/// The result is as long as the longer input; the shorter one simply stops
/// contributing at its own end (no looping). No clipping is applied, so sums
/// may exceed full scale. If the layouts differ the mono side is expanded to
/// stereo, and the wider sample width of the two is kept.
pub fn overlay(base: &AudioBuffer, top: &AudioBuffer) -> Result<AudioBuffer> {
    if base.sample_rate() != top.sample_rate() {
        return Err(MixdownError::invalid(format!(
            "cannot overlay {} Hz audio onto {} Hz audio",
            top.sample_rate(),
            base.sample_rate()
        )));
    }

    let layout = base.layout().widest(top.layout());
    let width = base.width().max(top.width());
    let base = base.to_layout(layout);
    let top = top.to_layout(layout);

    let len = base.samples().len().max(top.samples().len());
    let mut samples = base.into_samples();
    samples.resize(len, 0.0);
    for (dst, src) in samples.iter_mut().zip(top.samples()) {
        *dst += *src;
    }

    AudioBuffer::new(top.sample_rate(), layout, width, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChannelLayout, SampleWidth};

    fn mono(samples: Vec<f32>) -> AudioBuffer {
        AudioBuffer::new(48000, ChannelLayout::Mono, SampleWidth::Int16, samples).unwrap()
    }

    #[test]
    fn test_overlay_sums_samples() {
        let out = overlay(&mono(vec![0.5, 0.5]), &mono(vec![0.25, -0.5])).unwrap();
        assert_eq!(out.samples(), &[0.75, 0.0]);
    }

    #[test]
    fn test_overlay_extends_to_longer_input() {
        let out = overlay(&mono(vec![0.5]), &mono(vec![0.1, 0.2, 0.3])).unwrap();
        assert_eq!(out.frames(), 3);
        assert!((out.samples()[0] - 0.6).abs() < 1e-6);
        assert_eq!(&out.samples()[1..], &[0.2, 0.3]);
    }

    #[test]
    fn test_overlay_shorter_top_stops_at_its_end() {
        let out = overlay(&mono(vec![0.0; 4]), &mono(vec![1.0, 1.0])).unwrap();
        assert_eq!(out.samples(), &[1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_overlay_does_not_clip() {
        let out = overlay(&mono(vec![0.9]), &mono(vec![0.9])).unwrap();
        assert!((out.samples()[0] - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_overlay_mixed_layouts_becomes_stereo() {
        let stereo =
            AudioBuffer::new(48000, ChannelLayout::Stereo, SampleWidth::Int24, vec![0.1, 0.2]).unwrap();
        let out = overlay(&mono(vec![0.5, 0.5]), &stereo).unwrap();
        assert_eq!(out.layout(), ChannelLayout::Stereo);
        assert_eq!(out.width(), SampleWidth::Int24);
        assert_eq!(out.frames(), 2);
        assert!((out.samples()[0] - 0.6).abs() < 1e-6);
        assert!((out.samples()[1] - 0.7).abs() < 1e-6);
        assert_eq!(&out.samples()[2..], &[0.5, 0.5]);
    }

    #[test]
    fn test_overlay_rate_mismatch_rejected() {
        let other = AudioBuffer::new(44100, ChannelLayout::Mono, SampleWidth::Int16, vec![0.1]).unwrap();
        assert!(matches!(
            overlay(&mono(vec![0.1]), &other),
            Err(MixdownError::InvalidInput(_))
        ));
    }
}
