//! Input fetching: download, spill to scratch, decode, conform

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::audio_file::{decode_file, extension_hint};
use crate::dsp::resample;
use crate::error::{MixdownError, Result};
use crate::storage::BlobStore;
use crate::types::AudioBuffer;

/// Per-request scratch directory, removed when dropped
pub(crate) fn scratch_dir(parent: Option<&Path>) -> Result<tempfile::TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("mixdown-");
    let dir = match parent {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            builder.tempdir_in(parent)?
        }
        None => builder.tempdir()?,
    };
    log::debug!("Scratch directory {:?}", dir.path());
    Ok(dir)
}

/// Fetch one object, write it to `scratch` as `{name}.{ext}` and decode it
pub(crate) fn fetch_input(
    store: &dyn BlobStore,
    url: &str,
    scratch: &Path,
    name: &str,
) -> Result<AudioBuffer> {
    if url.trim().is_empty() {
        return Err(MixdownError::invalid(format!("{}: URL is empty", name)));
    }

    let bytes = store.fetch(url)?;
    let path = scratch_file(scratch, name, extension_hint(url).as_deref());
    std::fs::write(&path, &bytes)?;

    let buffer = decode_file(&path)?;
    log::info!(
        "Fetched {} ({} bytes, {} frames @ {} Hz)",
        url,
        bytes.len(),
        buffer.frames(),
        buffer.sample_rate()
    );
    Ok(buffer)
}

/// Fetch and decode `urls` in parallel on `pool`, conformed to `working_rate`
///
/// Results keep the order of `urls`. The first failure fails the batch.
pub(crate) fn fetch_inputs(
    pool: &rayon::ThreadPool,
    store: &dyn BlobStore,
    urls: &[String],
    scratch: &Path,
    label: &str,
    working_rate: u32,
) -> Result<Vec<AudioBuffer>> {
    pool.install(|| {
        urls.par_iter()
            .enumerate()
            .map(|(index, url)| {
                let name = format!("{}-{}", label, index);
                let buffer = fetch_input(store, url, scratch, &name)?;
                if buffer.sample_rate() != working_rate {
                    log::info!(
                        "Conforming {} from {} Hz to {} Hz",
                        name,
                        buffer.sample_rate(),
                        working_rate
                    );
                }
                resample(&buffer, working_rate)
            })
            .collect()
    })
}

fn scratch_file(scratch: &Path, name: &str, extension: Option<&str>) -> PathBuf {
    match extension {
        Some(ext) if ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            scratch.join(format!("{}.{}", name, ext))
        }
        _ => scratch.join(name),
    }
}
