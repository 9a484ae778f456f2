//! Mastering service: fetch -> mix -> vocals -> master -> encode -> store
//!
//! The service owns a rayon pool used to fetch and decode inputs in parallel.
//! Everything after decoding runs on the calling thread. Each request gets its
//! own scratch directory, removed on every exit path.

use std::sync::Arc;

use crate::audio_file::{encode, EncodeTarget};
use crate::config::{ProcessingConfig, ServiceConfig};
use crate::engine::{combine_vocals, mix, overlay_vocals};
use crate::error::{MixdownError, Result};
use crate::mastering::{master_with_metrics, MasteringProfile};
use crate::storage::{validate_key, BlobStore};

use super::fetch::{fetch_inputs, scratch_dir};
use super::messages::{MasterRequest, MasterResponse};
use super::{blob_store_from_config, require_store};

/// Runs mastering requests against a blob store
pub struct MasterService {
    store: Option<Arc<dyn BlobStore>>,
    processing: ProcessingConfig,
    /// Pool for parallel fetch + decode
    fetch_pool: rayon::ThreadPool,
}

impl MasterService {
    /// Create a service; `store` may be absent, in which case every request
    /// fails with [`MixdownError::UnconfiguredDependency`]
    pub fn new(store: Option<Arc<dyn BlobStore>>, processing: ProcessingConfig) -> Result<Self> {
        if processing.working_sample_rate == 0 || processing.output_sample_rate == 0 {
            return Err(MixdownError::invalid("configured sample rates must be positive"));
        }

        let fetch_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(processing.fetch_threads.max(1))
            .thread_name(|i| format!("mixdown-fetch-{}", i))
            .build()
            .map_err(|e| MixdownError::Io(std::io::Error::other(e)))?;

        Ok(Self {
            store,
            processing,
            fetch_pool,
        })
    }

    /// Create a service from the full service config
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(blob_store_from_config(config)?, config.processing.clone())
    }

    /// Process one mastering request
    pub fn process(&self, request: &MasterRequest) -> Result<MasterResponse> {
        let store = require_store(&self.store)?;

        if request.stem_urls.is_empty() {
            return Err(MixdownError::invalid("request has no stem URLs"));
        }
        validate_key(&request.output_key)?;

        log::info!(
            "Master request: {} stems, {} vocal takes, profile '{}' -> {}",
            request.stem_urls.len(),
            request.vocal_takes.len(),
            request.profile,
            request.output_key
        );

        let scratch = scratch_dir(self.processing.scratch_dir.as_deref())?;
        let working_rate = self.processing.working_sample_rate;

        let stems = fetch_inputs(
            &self.fetch_pool,
            store,
            &request.stem_urls,
            scratch.path(),
            "stem",
            working_rate,
        )?;
        let mixed = mix(&stems, &request.channel_settings())?;
        drop(stems);

        let takes = fetch_inputs(
            &self.fetch_pool,
            store,
            &request.vocal_urls(),
            scratch.path(),
            "vocal",
            working_rate,
        )?;
        let vocals = combine_vocals(&takes, &request.vocal_settings())?;
        let mixed = overlay_vocals(&mixed, vocals.as_ref())?;

        let profile = MasteringProfile::by_name(&request.profile);
        let result = master_with_metrics(&mixed, &profile)?;

        let target = EncodeTarget::Wav {
            sample_rate: self.processing.output_sample_rate,
            width: result.buffer.width(),
        };
        let bytes = encode(&result.buffer, &target)?;

        let output_url = store.store(&request.output_key, &bytes, target.content_type())?;
        log::info!("Master stored at {}", output_url);

        Ok(MasterResponse {
            output_url,
            duration: result.metrics.duration_seconds,
            peak_db: result.metrics.peak_db,
            lufs: result.metrics.loudness_lufs,
        })
    }
}
