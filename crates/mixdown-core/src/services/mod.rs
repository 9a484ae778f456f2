//! Request-level services
//!
//! - [`MasterService`]: fetch stems and vocal takes, mix, master, store a WAV
//! - [`EncodeService`]: fetch a stored file, transcode and tag it, store the result
//! - [`ArchiveService`]: fetch stored files, zip them, store the archive
//!
//! All are built from an optional blob store. A service without one refuses
//! every request with [`MixdownError::UnconfiguredDependency`].

mod archive;
mod encode;
mod fetch;
mod master;
mod messages;

pub use archive::ArchiveService;
pub use encode::EncodeService;
pub use master::MasterService;
pub use messages::{
    ArchiveEntry, EncodeRequest, EncodeResponse, MasterRequest, MasterResponse, MixChannel,
    VocalTake, ZipRequest, ZipResponse,
};

use std::sync::Arc;

use crate::config::ServiceConfig;
use crate::error::{MixdownError, Result};
use crate::storage::{BlobStore, HttpBlobStore};

/// Build the configured blob store, if any
pub fn blob_store_from_config(config: &ServiceConfig) -> Result<Option<Arc<dyn BlobStore>>> {
    match &config.storage {
        Some(storage) => {
            let store: Arc<dyn BlobStore> = Arc::new(HttpBlobStore::from_config(storage)?);
            Ok(Some(store))
        }
        None => {
            log::warn!("No storage configured, requests will be refused");
            Ok(None)
        }
    }
}

fn require_store(store: &Option<Arc<dyn BlobStore>>) -> Result<&dyn BlobStore> {
    store
        .as_deref()
        .ok_or(MixdownError::UnconfiguredDependency("blob store"))
}
