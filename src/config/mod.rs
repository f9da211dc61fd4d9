pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::{ConfigMessage, StatuslineConfig};

/// Environment variable naming an explicit config file (used by tests).
pub const CONFIG_ENV_VAR: &str = "TOKENLINE_CONFIG";

/// Load the statusline config, silently falling back to defaults.
///
/// Lookup order: `explicit` (from `--config`), then `TOKENLINE_CONFIG`,
/// then `~/.config/tokenline/statusline.toml` (platform-appropriate).
/// A missing or unparseable file yields the default config; invalid values
/// are replaced by their defaults and reported through `tracing`.
pub fn load(explicit: Option<&Path>) -> StatuslineConfig {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
        .or_else(default_config_path);

    let mut config = match path {
        Some(path) if path.exists() => match read_config(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("ignoring config {}: {:#}", path.display(), e);
                StatuslineConfig::default()
            }
        },
        _ => StatuslineConfig::default(),
    };

    for msg in config.sanitize() {
        match msg {
            ConfigMessage::Warning(w) => tracing::warn!("config warning: {}", w),
        }
    }

    config
}

fn read_config(path: &Path) -> Result<StatuslineConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(config)
}

/// Return the platform-specific config file (~/.config/tokenline/statusline.toml on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tokenline").join("statusline.toml"))
}
