//! Service configuration
//!
//! ```yaml
//! storage:
//!   endpoint: https://objects.example.com
//!   bucket: masters
//!   public_url: https://cdn.example.com
//!   auth_token: secret
//!   timeout_secs: 120
//! processing:
//!   working_sample_rate: 48000
//!   output_sample_rate: 48000
//!   fetch_threads: 4
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_SAMPLE_RATE;

/// Top-level configuration for the mastering and encode services
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Object storage. Without it the services refuse to run.
    pub storage: Option<StorageConfig>,
    pub processing: ProcessingConfig,
}

/// HTTP object storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL of the storage API (e.g. `https://objects.example.com`)
    pub endpoint: String,
    /// Bucket uploads are written to
    pub bucket: String,
    /// Public base URL for stored objects; falls back to `{endpoint}/{bucket}`
    pub public_url: Option<String>,
    /// Bearer token sent with uploads and downloads
    pub auth_token: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            public_url: None,
            auth_token: None,
            timeout_secs: 120,
        }
    }
}

/// Audio processing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Rate every decoded input is conformed to before mixing
    pub working_sample_rate: u32,
    /// Rate of the stored master
    pub output_sample_rate: u32,
    /// Threads used to fetch and decode inputs in parallel
    pub fetch_threads: usize,
    /// Parent directory for per-request scratch dirs (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            working_sample_rate: DEFAULT_SAMPLE_RATE,
            output_sample_rate: DEFAULT_SAMPLE_RATE,
            fetch_threads: 4,
            scratch_dir: None,
        }
    }
}
