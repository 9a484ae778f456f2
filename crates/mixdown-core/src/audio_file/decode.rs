//! Decoding of fetched stems and vocal takes (symphonia)

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{MixdownError, Result};
use crate::types::{AudioBuffer, ChannelLayout, SampleWidth};

/// Decode an audio file, using its extension as a format hint
pub fn decode_file(path: &Path) -> Result<AudioBuffer> {
    let file = File::open(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    decode_source(Box::new(file), extension)
}

/// Decode an in-memory byte stream
///
/// `extension` (e.g. `"wav"`) helps the probe but is not required.
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioBuffer> {
    decode_source(Box::new(Cursor::new(bytes)), extension)
}

/// File extension of a URL or path, ignoring any query string or fragment
pub fn extension_hint(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let name = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn decode_source(source: Box<dyn MediaSource>, extension: Option<&str>) -> Result<AudioBuffer> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| MixdownError::Decode(format!("unrecognized format: {}", e)))?;

    let mut format = probed.format;

    // First real audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| MixdownError::Decode("no audio track found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());
    let width = track
        .codec_params
        .bits_per_sample
        .and_then(SampleWidth::from_bits)
        .unwrap_or(SampleWidth::Int16);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| MixdownError::Decode(e.to_string()))?;

    let mut interleaved: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                log::warn!("Error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Error decoding packet: {}", e);
                continue;
            }
        };

        if sample_buf.is_none() {
            let spec = *decoded.spec();
            sample_rate = Some(spec.rate);
            channels = Some(spec.channels.count());
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buf.samples());
        }
    }

    let sample_rate = sample_rate
        .filter(|&r| r > 0)
        .ok_or_else(|| MixdownError::Decode("unknown sample rate".to_string()))?;
    let channels = channels
        .filter(|&c| c > 0)
        .ok_or_else(|| MixdownError::Decode("unknown channel layout".to_string()))?;

    // Anything wider than stereo keeps its first two channels
    let (layout, samples) = match ChannelLayout::from_count(channels) {
        Some(layout) => (layout, interleaved),
        None => {
            log::warn!("Source has {} channels, keeping the first two", channels);
            let samples = interleaved
                .chunks_exact(channels)
                .flat_map(|frame| [frame[0], frame[1]])
                .collect();
            (ChannelLayout::Stereo, samples)
        }
    };

    if samples.iter().any(|s| !s.is_finite()) {
        return Err(MixdownError::Decode(
            "source contains non-finite samples".to_string(),
        ));
    }

    let buffer = AudioBuffer::new(sample_rate, layout, width, samples)?;
    log::debug!(
        "Decoded {} frames ({:?}, {} Hz, {}-bit)",
        buffer.frames(),
        layout,
        sample_rate,
        width.bits()
    );
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_hint() {
        assert_eq!(extension_hint("https://cdn.example.com/a/b/drums.WAV"), Some("wav".into()));
        assert_eq!(extension_hint("https://x.test/take.flac?sig=abc.def"), Some("flac".into()));
        assert_eq!(extension_hint("/tmp/scratch/stem-0.mp3"), Some("mp3".into()));
        assert_eq!(extension_hint("https://x.test/no-extension"), None);
        assert_eq!(extension_hint("https://x.test/.hidden"), None);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result = decode_bytes(vec![0x42; 512], None);
        assert!(matches!(result, Err(MixdownError::Decode(_))));
    }

    #[test]
    fn test_float_source_with_infinity_rejected() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for sample in [0.5_f32, f32::INFINITY, 0.25, -0.5] {
                writer.write_sample(sample).unwrap();
            }
            writer.finalize().unwrap();
        }

        let result = decode_bytes(cursor.into_inner(), Some("wav"));
        assert!(matches!(result, Err(MixdownError::Decode(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = decode_file(Path::new("/definitely/not/here.wav"));
        assert!(matches!(result, Err(MixdownError::Io(_))));
    }
}
