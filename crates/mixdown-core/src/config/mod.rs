//! Configuration for mixdown services
//!
//! - YAML config loading/saving (defaults on missing or broken files)
//! - YAML/JSON request document parsing
//! - Standard config paths
//! - [`ServiceConfig`] with storage and processing sections

mod io;
mod paths;
mod service;

pub use io::{load_config, read_document, save_config};
pub use paths::{default_config_dir, default_config_path};
pub use service::{ProcessingConfig, ServiceConfig, StorageConfig};
