//! Remote object storage
//!
//! The pipeline only ever talks to storage through [`BlobStore`]: fetch an
//! object by URL, store bytes under a key and get its public URL back.
//! Services hold the store as `Arc<dyn BlobStore>`, shared across requests.

mod http;
#[cfg(any(test, feature = "test-double"))]
mod test_double;

pub use http::HttpBlobStore;
#[cfg(any(test, feature = "test-double"))]
pub use test_double::{StoredObject, TestDoubleBlobStore};

use crate::error::{MixdownError, Result};

/// Fetch-by-URL / store-by-key object storage
pub trait BlobStore: Send + Sync {
    /// Download the object at `url`
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Upload `data` under `key` and return the object's public URL
    fn store(&self, key: &str, data: &[u8], content_type: &str) -> Result<String>;
}

/// Check an object key is safe to append to a bucket URL
///
/// Keys must be non-empty relative paths without `.`/`..` segments,
/// whitespace or control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(MixdownError::invalid("output key is empty"));
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(MixdownError::invalid(format!(
            "output key '{}' must not start or end with '/'",
            key
        )));
    }
    if key.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(MixdownError::invalid(format!(
            "output key '{}' contains whitespace or control characters",
            key
        )));
    }
    if key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(MixdownError::invalid(format!(
            "output key '{}' has an empty or relative segment",
            key
        )));
    }
    Ok(())
}
