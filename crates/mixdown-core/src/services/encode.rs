//! Encode service: fetch a stored file and transcode it to WAV or FLAC

use std::sync::Arc;

use crate::audio_file::{encode, write_tags, EncodeFormat, EncodeTarget, TrackMetadata};
use crate::config::{ProcessingConfig, ServiceConfig};
use crate::error::{MixdownError, Result};
use crate::storage::{validate_key, BlobStore};
use crate::types::SampleWidth;

use super::fetch::{fetch_input, scratch_dir};
use super::messages::{EncodeRequest, EncodeResponse};
use super::{blob_store_from_config, require_store};

/// Runs encode requests against a blob store
pub struct EncodeService {
    store: Option<Arc<dyn BlobStore>>,
    processing: ProcessingConfig,
}

impl EncodeService {
    pub fn new(store: Option<Arc<dyn BlobStore>>, processing: ProcessingConfig) -> Self {
        Self { store, processing }
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self::new(blob_store_from_config(config)?, config.processing.clone()))
    }

    /// Process one encode request
    pub fn process(&self, request: &EncodeRequest) -> Result<EncodeResponse> {
        let store = require_store(&self.store)?;

        let format = EncodeFormat::parse(&request.format)?;
        if request.sample_rate == 0 {
            return Err(MixdownError::invalid("sample rate must be positive"));
        }
        validate_key(&request.output_key)?;
        let width = SampleWidth::from_bit_depth_or_default(request.bit_depth);
        let target = EncodeTarget::new(format, request.sample_rate, width);
        let metadata = TrackMetadata::from_map(&request.metadata);

        log::info!(
            "Encode request: {} -> {} ({} Hz, {}-bit)",
            request.input_url,
            format,
            request.sample_rate,
            width.bits()
        );

        let scratch = scratch_dir(self.processing.scratch_dir.as_deref())?;
        let input = fetch_input(store, &request.input_url, scratch.path(), "input")?;
        let output_path = scratch.path().join(format!("output.{}", format.as_str()));
        std::fs::write(&output_path, encode(&input, &target)?)?;
        write_tags(&output_path, format, &metadata)?;

        let bytes = std::fs::read(&output_path)?;
        let output_url = store.store(&request.output_key, &bytes, target.content_type())?;
        log::info!("Encoded output stored at {}", output_url);

        Ok(EncodeResponse {
            output_url,
            format: format.as_str().to_string(),
            size: bytes.len() as u64,
        })
    }
}
