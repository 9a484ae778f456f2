//! The mastering chain: EQ -> compression -> normalization -> limiting
//!
//! Stages run in a fixed order and each returns a new buffer, so mastering the
//! same input with the same profile always produces the same output.

use crate::dsp::{apply_gain_db, compress, high_pass, limit, low_pass, normalize};
use crate::error::{MixdownError, Result};
use crate::types::AudioBuffer;

use super::metrics::{MasterMetrics, MasterResult};
use super::profile::MasteringProfile;

/// Cutoff of the low shelf stage
pub const EQ_LOW_CUTOFF_HZ: f32 = 200.0;

/// Cutoff of the high shelf stage
pub const EQ_HIGH_CUTOFF_HZ: f32 = 8000.0;

/// Run the full chain on `input`
///
/// Zero-frame input is rejected. The mid band and loudness target of the
/// profile are not used.
pub fn master(input: &AudioBuffer, profile: &MasteringProfile) -> Result<AudioBuffer> {
    if input.frames() == 0 {
        return Err(MixdownError::invalid("cannot master an empty buffer"));
    }
    profile.validate()?;

    log::info!(
        "Mastering {} frames @ {} Hz (eq {}/{} dB, comp {} dB {}:1, limit {} dB)",
        input.frames(),
        input.sample_rate(),
        profile.eq_low_db,
        profile.eq_high_db,
        profile.compression_threshold_db,
        profile.compression_ratio,
        profile.limiter_threshold_db
    );

    let out = equalize(input, profile);
    let out = compress(&out, profile.compression_threshold_db, profile.compression_ratio);
    let out = normalize(&out);
    let out = limit(&out, profile.limiter_threshold_db);
    Ok(out)
}

/// Master `input` and measure the result
pub fn master_with_metrics(input: &AudioBuffer, profile: &MasteringProfile) -> Result<MasterResult> {
    let buffer = master(input, profile)?;
    let metrics = MasterMetrics::measure(&buffer);
    log::info!(
        "Master ready: {:.2}s, peak {:.2} dBFS, {:.1} LUFS",
        metrics.duration_seconds,
        metrics.peak_db,
        metrics.loudness_lufs
    );
    Ok(MasterResult { buffer, metrics })
}

/// Shelf EQ approximation
///
/// The high stage filters the output of the low stage, not the dry input.
fn equalize(input: &AudioBuffer, profile: &MasteringProfile) -> AudioBuffer {
    let mut out = input.clone();
    if profile.eq_low_db != 0.0 {
        out = apply_gain_db(&low_pass(&out, EQ_LOW_CUTOFF_HZ), profile.eq_low_db);
    }
    if profile.eq_high_db != 0.0 {
        out = apply_gain_db(&high_pass(&out, EQ_HIGH_CUTOFF_HZ), profile.eq_high_db);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{linear_to_db, normalize};
    use crate::mastering::{loudness_lufs, ProfileName, SILENCE_LUFS};
    use crate::types::{ChannelLayout, SampleWidth};

    fn tone(frames: usize, level: f32) -> AudioBuffer {
        let samples = (0..frames)
            .flat_map(|i| {
                let t = i as f32 / 48000.0;
                let l = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * level;
                let r = (2.0 * std::f32::consts::PI * 660.0 * t).sin() * level * 0.5;
                [l, r]
            })
            .collect();
        AudioBuffer::new(48000, ChannelLayout::Stereo, SampleWidth::Int16, samples).unwrap()
    }

    #[test]
    fn test_empty_input_rejected() {
        let empty = AudioBuffer::silence(48000, ChannelLayout::Stereo, SampleWidth::Int16, 0);
        assert!(matches!(
            master(&empty, &MasteringProfile::default()),
            Err(MixdownError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_peak_lands_on_limiter_threshold() {
        let input = tone(4800, 0.3);
        for name in ProfileName::ALL {
            let profile = name.profile();
            let out = master(&input, &profile).unwrap();
            let peak = linear_to_db(out.peak());
            assert!(
                peak <= profile.limiter_threshold_db + 1e-3,
                "{}: peak {} above {}",
                name,
                peak,
                profile.limiter_threshold_db
            );
            assert!((peak - profile.limiter_threshold_db).abs() < 1e-3);
        }
    }

    #[test]
    fn test_master_is_deterministic() {
        let input = tone(2400, 0.8);
        let profile = ProfileName::Loud.profile();
        assert_eq!(master(&input, &profile).unwrap(), master(&input, &profile).unwrap());
    }

    #[test]
    fn test_unknown_profile_matches_clean() {
        let input = tone(2400, 0.5);
        let disco = master(&input, &MasteringProfile::by_name("disco")).unwrap();
        let clean = master(&input, &ProfileName::Clean.profile()).unwrap();
        assert_eq!(disco, clean);
    }

    #[test]
    fn test_silence_stays_silent() {
        let silence = AudioBuffer::silence(48000, ChannelLayout::Mono, SampleWidth::Int16, 4800);
        let result = master_with_metrics(&silence, &ProfileName::Warm.profile()).unwrap();
        assert!(result.buffer.samples().iter().all(|&s| s == 0.0));
        assert_eq!(result.metrics.loudness_lufs, SILENCE_LUFS);
        assert_eq!(loudness_lufs(&result.buffer), SILENCE_LUFS);
    }

    #[test]
    fn test_preserves_format() {
        let input = tone(1000, 0.5).with_width(SampleWidth::Int24);
        let out = master(&input, &ProfileName::Warm.profile()).unwrap();
        assert_eq!(out.frames(), 1000);
        assert_eq!(out.layout(), ChannelLayout::Stereo);
        assert_eq!(out.width(), SampleWidth::Int24);
        assert_eq!(out.sample_rate(), 48000);
    }

    #[test]
    fn test_invalid_profile_rejected() {
        let mut profile = MasteringProfile::default();
        profile.compression_ratio = f32::INFINITY;
        assert!(master(&tone(100, 0.5), &profile).is_err());
    }

    #[test]
    fn test_neutral_profile_is_plain_normalization() {
        let profile = MasteringProfile {
            eq_low_db: 0.0,
            eq_mid_db: 0.0,
            eq_high_db: 0.0,
            compression_threshold_db: -20.0,
            compression_ratio: 1.0,
            limiter_threshold_db: 3.0,
            target_lufs: -14.0,
        };
        let input = tone(2400, 0.3);
        assert_eq!(master(&input, &profile).unwrap(), normalize(&input));
    }

    #[test]
    fn test_remastering_keeps_peak() {
        let input = tone(4800, 0.6);
        for name in ProfileName::ALL {
            let profile = name.profile();
            let once = master(&input, &profile).unwrap();
            let twice = master(&once, &profile).unwrap();
            let delta = (linear_to_db(twice.peak()) - linear_to_db(once.peak())).abs();
            assert!(delta < 1e-3, "{}: peak moved by {} dB", name, delta);
        }
    }

    #[test]
    fn test_metrics_duration() {
        let result = master_with_metrics(&tone(24000, 0.5), &MasteringProfile::default()).unwrap();
        assert!((result.metrics.duration_seconds - 0.5).abs() < 1e-9);
        assert!(result.metrics.loudness_lufs < 0.0);
    }
}
