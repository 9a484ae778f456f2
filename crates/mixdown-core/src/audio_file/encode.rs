//! Encoding of mastered buffers (WAV via hound, FLAC via flacenc)

use std::io::Cursor;

use flacenc::component::BitRepr;
use flacenc::error::Verify;
use hound::{SampleFormat, WavSpec, WavWriter};
use serde::{Deserialize, Serialize};

use crate::dsp::resample;
use crate::error::{MixdownError, Result};
use crate::types::{AudioBuffer, SampleWidth};

/// Output container/codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    Wav,
    Flac,
}

impl EncodeFormat {
    /// Parse a user-supplied format name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wav" | "wave" => Ok(EncodeFormat::Wav),
            "flac" => Ok(EncodeFormat::Flac),
            other => Err(MixdownError::invalid(format!(
                "unsupported output format '{}' (expected wav or flac)",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EncodeFormat::Wav => "wav",
            EncodeFormat::Flac => "flac",
        }
    }

    /// MIME type used when storing encoded output
    pub fn content_type(&self) -> &'static str {
        match self {
            EncodeFormat::Wav => "audio/wav",
            EncodeFormat::Flac => "audio/flac",
        }
    }
}

impl std::fmt::Display for EncodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to encode a buffer into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeTarget {
    /// Integer PCM WAV
    Wav { sample_rate: u32, width: SampleWidth },
    /// Lossless FLAC (16 or 24-bit)
    Flac { sample_rate: u32, width: SampleWidth },
}

impl EncodeTarget {
    pub fn new(format: EncodeFormat, sample_rate: u32, width: SampleWidth) -> Self {
        match format {
            EncodeFormat::Wav => EncodeTarget::Wav { sample_rate, width },
            EncodeFormat::Flac => EncodeTarget::Flac { sample_rate, width },
        }
    }

    pub fn format(&self) -> EncodeFormat {
        match self {
            EncodeTarget::Wav { .. } => EncodeFormat::Wav,
            EncodeTarget::Flac { .. } => EncodeFormat::Flac,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        match *self {
            EncodeTarget::Wav { sample_rate, .. } | EncodeTarget::Flac { sample_rate, .. } => {
                sample_rate
            }
        }
    }

    pub fn width(&self) -> SampleWidth {
        match *self {
            EncodeTarget::Wav { width, .. } | EncodeTarget::Flac { width, .. } => width,
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.format().content_type()
    }
}

/// Encode `buffer` to the target's container, rate and sample width
///
/// The buffer is resampled first when its rate differs from the target's.
/// Samples beyond full scale are clamped during quantization.
pub fn encode(buffer: &AudioBuffer, target: &EncodeTarget) -> Result<Vec<u8>> {
    if target.sample_rate() == 0 {
        return Err(MixdownError::invalid("output sample rate must be positive"));
    }
    if let EncodeTarget::Flac { width: SampleWidth::Int32, .. } = target {
        return Err(MixdownError::invalid("FLAC output supports 16 or 24-bit only"));
    }

    let conformed = resample(buffer, target.sample_rate())?.with_width(target.width());

    let bytes = match target {
        EncodeTarget::Wav { .. } => write_wav(&conformed)?,
        EncodeTarget::Flac { .. } => write_flac(&conformed)?,
    };

    log::info!(
        "Encoded {} frames to {} ({} Hz, {}-bit, {} bytes)",
        conformed.frames(),
        target.format(),
        conformed.sample_rate(),
        conformed.width().bits(),
        bytes.len()
    );
    Ok(bytes)
}

fn write_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: buffer.channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: buffer.width().bits() as u16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).map_err(wav_error)?;
        for value in buffer.to_fixed_point() {
            writer.write_sample(value).map_err(wav_error)?;
        }
        writer.finalize().map_err(wav_error)?;
    }
    Ok(cursor.into_inner())
}

fn wav_error(e: hound::Error) -> MixdownError {
    MixdownError::Encode(format!("WAV: {}", e))
}

fn write_flac(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let config = flacenc::config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| MixdownError::Encode(format!("FLAC config: {:?}", e)))?;

    let values = buffer.to_fixed_point();
    let source = flacenc::source::MemSource::from_samples(
        &values,
        buffer.channels(),
        buffer.width().bits() as usize,
        buffer.sample_rate() as usize,
    );

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| MixdownError::Encode(format!("FLAC: {:?}", e)))?;

    let mut sink = flacenc::bitsink::ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|_| MixdownError::Encode("FLAC: failed to serialize stream".to_string()))?;
    Ok(sink.as_slice().to_vec())
}
