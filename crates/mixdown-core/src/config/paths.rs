//! Standard locations for mixdown files

use std::path::PathBuf;

/// Directory holding mixdown's configuration
///
/// Returns: `~/.config/mixdown` (platform config dir via `dirs`)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mixdown")
}

/// Default service configuration file
///
/// Returns: `~/.config/mixdown/config.yaml`
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}
