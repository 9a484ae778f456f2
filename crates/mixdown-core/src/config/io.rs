//! YAML/JSON document I/O for configuration and request files

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Load a configuration file, falling back to defaults
///
/// A missing file yields `T::default()`. A file that exists but cannot be
/// read or parsed is logged and also yields the defaults, so a broken config
/// never prevents startup.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return T::default();
    }

    match read_document(path) {
        Ok(config) => {
            log::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Ignoring config at {:?}: {:#}", path, e);
            T::default()
        }
    }
}

/// Save configuration as YAML, creating parent directories as needed
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("Saved config to {:?}", path);
    Ok(())
}

/// Read and parse a YAML or JSON document
///
/// Files ending in `.json` are parsed as JSON, everything else as YAML.
pub fn read_document<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {:?}", path))
    } else {
        serde_yaml::from_str(&contents).with_context(|| format!("Invalid YAML in {:?}", path))
    }
}
